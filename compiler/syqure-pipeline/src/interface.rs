//! The contract between the driver and a compiler toolchain.
//!
//! The driver never looks inside the compiler. It creates a
//! [CompilerSession] per build from a [Toolchain] and walks it through
//! loading plugins, parsing, compiling and then either running the program
//! in-process or writing it out as an executable.

use std::{fmt, path::Path};

use thiserror::Error;

use crate::settings::CompilerSettings;

/// The message used when a toolchain fails without saying why.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown compilation error";

pub type ToolchainResult<T> = Result<T, ToolchainError>;

/// Which part of the toolchain an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainErrorKind {
    /// The source could not be parsed or type checked.
    Parser,

    /// A plugin could not be found or loaded.
    Plugin,

    /// The compiled program failed while running.
    Runtime,

    /// A file could not be read or written.
    Io,

    /// Anything else, e.g. a failing code generator or linker.
    Other,
}

impl ToolchainErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parser => "parser",
            Self::Plugin => "plugin",
            Self::Runtime => "runtime",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ToolchainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by the toolchain. The message is what the toolchain
/// rendered and is shown to the user as-is.
#[derive(Debug, Clone, Error)]
#[error("{}", self.message())]
pub struct ToolchainError {
    pub kind: ToolchainErrorKind,
    message: String,
}

impl ToolchainError {
    pub fn new(kind: ToolchainErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn parser(message: impl Into<String>) -> Self {
        Self::new(ToolchainErrorKind::Parser, message)
    }

    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(ToolchainErrorKind::Plugin, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ToolchainErrorKind::Runtime, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolchainErrorKind::Other, message)
    }

    /// The message of the error, or [UNKNOWN_ERROR_MESSAGE] if the toolchain
    /// didn't provide one.
    pub fn message(&self) -> &str {
        if self.message.trim().is_empty() { UNKNOWN_ERROR_MESSAGE } else { &self.message }
    }
}

impl From<std::io::Error> for ToolchainError {
    fn from(error: std::io::Error) -> Self {
        Self::new(ToolchainErrorKind::Io, error.to_string())
    }
}

/// Everything that is needed to write an executable, on top of the compiled
/// module.
#[derive(Debug, Clone, Copy)]
pub struct LinkOptions<'a> {
    /// The toolchain binary, used to locate its runtime libraries.
    pub argv0: &'a Path,

    /// Write a shared library rather than an executable.
    pub shared_lib: bool,

    pub libs: &'a [String],

    pub linker_flags: &'a str,
}

impl<'a> LinkOptions<'a> {
    pub fn from_settings(settings: &'a CompilerSettings) -> Self {
        Self {
            argv0: &settings.argv0,
            shared_lib: settings.shared_lib,
            libs: &settings.libs,
            linker_flags: &settings.linker_flags,
        }
    }
}

/// A compiler toolchain, e.g. an embedded Codon compiler.
pub trait Toolchain {
    type Session: CompilerSession;

    /// The version of the compiler, for reporting.
    fn version(&self) -> String;

    /// Create a fresh compiler configured with the mode, disabled passes and
    /// linking mode of `settings`.
    fn create_session(&self, settings: &CompilerSettings) -> Self::Session;
}

/// One compiler instance, used for exactly one build.
///
/// Anything written by the session (diagnostics, program output) must go
/// through the process's standard streams so that the driver can suppress or
/// capture it.
pub trait CompilerSession {
    /// Load a plugin, by name or path.
    fn load_plugin(&mut self, plugin: &str) -> ToolchainResult<()>;

    /// Parse the entry point of the program.
    fn parse_file(&mut self, input: &Path) -> ToolchainResult<()>;

    /// Compile everything that was parsed.
    fn compile(&mut self) -> ToolchainResult<()>;

    /// Run the compiled program. `args[0]` is the name of the program.
    fn run(&mut self, args: &[String], libs: &[String]) -> ToolchainResult<()>;

    /// Write the compiled program out to `output`.
    fn write_executable(&mut self, output: &Path, link: LinkOptions<'_>) -> ToolchainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_messages_become_unknown_errors() {
        assert_eq!(ToolchainError::parser("").to_string(), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(ToolchainError::other("  \n").message(), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(ToolchainError::plugin("no plugin `x`").to_string(), "no plugin `x`");
    }
}
