//! The saved state of one redirected standard stream.

use std::{
    io,
    os::fd::{AsFd, OwnedFd},
};

use crate::{fd, StdStream};

/// Owns the duplicate of a standard stream's original descriptor for as long
/// as the stream is (or may be) redirected. Restoring points the stream back
/// at the original file and closes the duplicate; it happens at most once,
/// either explicitly or when the scope is dropped.
///
/// Creating a scope does not redirect anything yet, see
/// [`RedirectionScope::redirect_to`]. A scope that is dropped before being
/// redirected restores the descriptor to what it already was.
#[derive(Debug)]
pub struct RedirectionScope {
    stream: StdStream,

    /// The duplicate of the original descriptor, [`None`] once restored.
    saved: Option<OwnedFd>,
}

impl RedirectionScope {
    /// Flush `stream` and save a duplicate of its current descriptor.
    pub fn save(stream: StdStream) -> io::Result<Self> {
        stream.flush();
        let saved = fd::duplicate(stream.raw_fd())?;

        Ok(Self { stream, saved: Some(saved) })
    }

    /// Point the stream at `target`. The caller keeps ownership of `target`,
    /// the stream descriptor holds its own reference to the file.
    pub fn redirect_to(&self, target: impl AsFd) -> io::Result<()> {
        fd::redirect(target.as_fd(), self.stream.raw_fd())
    }

    pub fn stream(&self) -> StdStream {
        self.stream
    }

    /// Whether the scope still holds the original descriptor.
    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Flush the stream, point it back at the original file and close the
    /// saved duplicate. Calling this more than once has no further effect.
    pub fn restore(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.stream.flush();

            // There is nothing left to fall back on if this fails, the stream
            // stays wherever it currently points.
            let _ = fd::redirect(saved.as_fd(), self.stream.raw_fd());
        }
    }
}

impl Drop for RedirectionScope {
    fn drop(&mut self) {
        self.restore();
    }
}
