//! Temporarily discarding everything written to a standard stream.

use std::io;

use crate::{fd, scope::RedirectionScope, StdStream};

/// The lifecycle of a [StreamSuppressor].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressorState {
    /// Suppression wasn't requested, or couldn't be set up. The stream is
    /// untouched and stays that way.
    Inert,

    /// The stream currently points at the discard device.
    Engaged,

    /// The stream was engaged and has since been restored.
    Restored,
}

/// Points a standard stream at the discard device until it is restored or
/// dropped.
///
/// When the stream can't be redirected (a descriptor can't be duplicated or
/// the discard device can't be opened) the suppressor quietly stays
/// [SuppressorState::Inert] and the output remains visible.
#[derive(Debug)]
pub struct StreamSuppressor {
    stream: StdStream,
    scope: Option<RedirectionScope>,
    state: SuppressorState,
}

impl StreamSuppressor {
    /// Suppress `stream` if `suppress` is set, otherwise create a suppressor
    /// that never touches the stream.
    pub fn engage(stream: StdStream, suppress: bool) -> Self {
        if !suppress {
            return Self { stream, scope: None, state: SuppressorState::Inert };
        }

        match Self::discard(stream) {
            Ok(scope) => Self { stream, scope: Some(scope), state: SuppressorState::Engaged },
            Err(error) => {
                log::debug!("leaving `{stream}` visible, couldn't suppress it: {error}");
                Self { stream, scope: None, state: SuppressorState::Inert }
            }
        }
    }

    /// Suppress the diagnostic stream, i.e. `stderr`.
    pub fn stderr(suppress: bool) -> Self {
        Self::engage(StdStream::Stderr, suppress)
    }

    fn discard(stream: StdStream) -> io::Result<RedirectionScope> {
        let scope = RedirectionScope::save(stream)?;
        let discard = fd::open_discard()?;
        scope.redirect_to(&discard)?;

        // `discard` is closed here, the stream descriptor keeps the device open.
        Ok(scope)
    }

    /// Make the stream visible again. This is a no-op unless the suppressor
    /// is currently engaged, so it may be called any number of times.
    pub fn restore(&mut self) {
        if let Some(mut scope) = self.scope.take() {
            scope.restore();
            self.state = SuppressorState::Restored;
        }
    }

    pub fn stream(&self) -> StdStream {
        self.stream
    }

    pub fn state(&self) -> SuppressorState {
        self.state
    }

    pub fn is_engaged(&self) -> bool {
        self.state == SuppressorState::Engaged
    }
}

impl Drop for StreamSuppressor {
    fn drop(&mut self) {
        self.restore();
    }
}
