//! A stream interface for the driver to write messages and replayed program
//! output to. In practice this is used by:
//!
//! - the [logger](crate::logging::CompilerLogger), which writes log records
//!   to either the output or the error stream,
//!
//! - the `syqure` binary, which writes the captured output of a program back
//!   out after the run has finished,
//!
//! - tests, which use an [CompilerOutputStream::Owned] stream to inspect what
//!   would have been printed.

use std::{io, sync::Arc};

use parking_lot::Mutex;

/// Where the output of the driver should be written to.
#[derive(Debug)]
pub enum CompilerOutputStream {
    /// Points to the process `stdout` stream.
    Stdout(io::Stdout),

    /// Points to the process `stderr` stream.
    Stderr(io::Stderr),

    /// An in-memory stream, shared between all clones.
    Owned(Arc<Mutex<Vec<u8>>>),
}

impl CompilerOutputStream {
    /// Create a new [CompilerOutputStream] which writes to `stdout`.
    pub fn stdout() -> Self {
        CompilerOutputStream::Stdout(io::stdout())
    }

    /// Create a new [CompilerOutputStream] which writes to `stderr`.
    pub fn stderr() -> Self {
        CompilerOutputStream::Stderr(io::stderr())
    }

    /// Create an owned [CompilerOutputStream].
    pub fn owned() -> Self {
        CompilerOutputStream::Owned(Arc::new(Mutex::new(Vec::new())))
    }

    /// Get everything that has been written to an owned stream so far, lossily
    /// decoded. Process streams have no recorded contents.
    pub fn contents(&self) -> Option<String> {
        match self {
            CompilerOutputStream::Owned(buffer) => {
                Some(String::from_utf8_lossy(&buffer.lock()).into_owned())
            }
            _ => None,
        }
    }
}

impl Clone for CompilerOutputStream {
    fn clone(&self) -> Self {
        match self {
            CompilerOutputStream::Stdout(_) => CompilerOutputStream::stdout(),
            CompilerOutputStream::Stderr(_) => CompilerOutputStream::stderr(),
            CompilerOutputStream::Owned(buffer) => CompilerOutputStream::Owned(buffer.clone()),
        }
    }
}

impl io::Write for CompilerOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompilerOutputStream::Stdout(stream) => stream.write(buf),
            CompilerOutputStream::Stderr(stream) => stream.write(buf),
            CompilerOutputStream::Owned(buffer) => {
                buffer.lock().extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompilerOutputStream::Stdout(stream) => stream.flush(),
            CompilerOutputStream::Stderr(stream) => stream.flush(),
            CompilerOutputStream::Owned(_) => Ok(()),
        }
    }
}

/// Write a line to a [CompilerOutputStream]. A failure to write a message
/// is not something the driver can act on, so the error is dropped.
#[macro_export]
macro_rules! stream_writeln {
    ($stream:expr, $($arg:tt)*) => {{
        use ::std::io::Write as _;
        let _ = ::std::writeln!($stream, $($arg)*);
    }};
}

/// Write to a [CompilerOutputStream] without a trailing newline.
#[macro_export]
macro_rules! stream_write {
    ($stream:expr, $($arg:tt)*) => {{
        use ::std::io::Write as _;
        let _ = ::std::write!($stream, $($arg)*);
    }};
}
