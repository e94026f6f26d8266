//! Errors that can occur when starting an [OutputCapture](crate::OutputCapture).
//! None of them leave a stream redirected.

use std::io;

use thiserror::Error;

use crate::StdStream;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// `start` was called on a capture that is already running.
    #[error("output is already being captured")]
    AlreadyActive,

    /// A pipe for the given stream couldn't be created.
    #[error("couldn't create a pipe for `{stream}`: {error}")]
    Pipe {
        stream: StdStream,
        #[source]
        error: io::Error,
    },

    /// The descriptor of the stream couldn't be saved or redirected.
    #[error("couldn't redirect `{stream}`: {error}")]
    Redirect {
        stream: StdStream,
        #[source]
        error: io::Error,
    },

    /// The background reader for the stream couldn't be spawned.
    #[error("couldn't start the `{stream}` reader: {error}")]
    Reader {
        stream: StdStream,
        #[source]
        error: io::Error,
    },

    /// The platform has no notion of redirecting descriptors.
    #[error("capturing output is not supported on this platform")]
    Unsupported,
}
