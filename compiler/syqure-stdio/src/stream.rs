use std::{fmt, io::Write};

/// One of the two standard output streams of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    Stdout,
    Stderr,
}

impl StdStream {
    pub fn name(self) -> &'static str {
        match self {
            StdStream::Stdout => "stdout",
            StdStream::Stderr => "stderr",
        }
    }

    /// The descriptor number of the stream.
    #[cfg(unix)]
    pub fn raw_fd(self) -> std::os::fd::RawFd {
        match self {
            StdStream::Stdout => libc::STDOUT_FILENO,
            StdStream::Stderr => libc::STDERR_FILENO,
        }
    }

    /// Push out anything still sitting in user-space buffers for this stream,
    /// both Rust's and the C library's (the toolchain writes through the
    /// latter). Must happen before the descriptor underneath is swapped.
    pub fn flush(self) {
        let _ = match self {
            StdStream::Stdout => std::io::stdout().flush(),
            StdStream::Stderr => std::io::stderr().flush(),
        };

        #[cfg(unix)]
        crate::fd::flush_c_stdio();
    }
}

impl fmt::Display for StdStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
