//! Process-wide redirection of the standard streams.
//!
//! This crate provides the two guards that the driver wraps around the
//! toolchain:
//!
//! - [StreamSuppressor] points a standard stream at the discard device for
//!   as long as it is engaged. It is used to hide compiler diagnostics when
//!   running in quiet mode.
//!
//! - [OutputCapture] points both `stdout` and `stderr` at pipes which are
//!   drained by background reader threads, so that the output of a program
//!   executed by the toolchain can be returned to the caller as text.
//!
//! Both operate on the descriptors of the process, which are global state.
//! Only one guard may redirect a given stream at a time, and nothing should
//! log while a stream is redirected.

mod error;
mod stream;

#[cfg(unix)]
mod capture;
#[cfg(unix)]
mod fd;
#[cfg(unix)]
mod scope;
#[cfg(unix)]
mod suppress;

#[cfg(not(unix))]
mod unsupported;

#[cfg(unix)]
pub use capture::{CapturedOutput, OutputCapture};
pub use error::CaptureError;
#[cfg(unix)]
pub use scope::RedirectionScope;
pub use stream::StdStream;
#[cfg(unix)]
pub use suppress::{StreamSuppressor, SuppressorState};
#[cfg(not(unix))]
pub use unsupported::{CapturedOutput, OutputCapture, StreamSuppressor, SuppressorState};
