//! Syqure general utilities shared across the workspace: logging, output
//! streams, terminal highlighting, the crash handler and timing helpers.

pub mod crash;
pub mod highlight;
pub mod logging;
pub mod stream;
pub mod timing;

// Re-export logging utility
pub use log;
