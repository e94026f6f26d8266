//! Defines the error type for the syqure pipeline. These errors can originate
//! from resolving the toolchain installation and source paths, or from a
//! toolchain failing to compile, run or write out a program.

use std::{io, path::PathBuf, process::exit};

use syqure_utils::{highlight::report_error, stream::CompilerOutputStream};
use thiserror::Error;

/// Errors that might occur when attempting to compile and or run a program.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The given source file doesn't exist.
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The program was compiled but failed to compile or to run. Anything the
    /// program wrote before failing is kept so that it can still be shown.
    #[error("codon run failed: {message}")]
    RunFailed { message: String, stdout: String, stderr: String },

    /// The program couldn't be built into an executable.
    #[error("codon build failed: {message}")]
    BuildFailed { message: String },

    /// Error that can occur when the pipeline tried to create a resource on
    /// the operating system, but the resource couldn't be created for some
    /// reason.
    #[error("couldn't create `{}`, {error}", path.display())]
    ResourceCreation {
        /// The item that was being created.
        path: PathBuf,

        /// The specific [io::Error] that occurred.
        #[source]
        error: io::Error,
    },

    /// Generic IO error.
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl PipelineError {
    /// Output that the program produced before the error occurred, if any.
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            Self::RunFailed { stdout, stderr, .. } => Some((stdout, stderr)),
            _ => None,
        }
    }

    pub fn report(&self, stream: CompilerOutputStream) {
        report_error(stream, self);
    }

    pub fn report_and_exit(&self) -> ! {
        self.report(CompilerOutputStream::stderr());
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_carry_the_toolchain_message() {
        let error = PipelineError::BuildFailed { message: "linker exited with 1".to_string() };
        assert_eq!(error.to_string(), "codon build failed: linker exited with 1");

        let error = PipelineError::SourceNotFound(PathBuf::from("missing.codon"));
        assert_eq!(error.to_string(), "source file not found: missing.codon");
        assert!(error.captured_output().is_none());
    }

    #[test]
    fn reports_are_written_to_the_given_stream() {
        let stream = CompilerOutputStream::owned();
        let error = PipelineError::RunFailed {
            message: "division by zero".to_string(),
            stdout: "partial\n".to_string(),
            stderr: String::new(),
        };

        error.report(stream.clone());

        let contents = stream.contents().unwrap();
        assert!(contents.contains("error"));
        assert!(contents.contains("codon run failed: division by zero"));
        assert_eq!(error.captured_output(), Some(("partial\n", "")));
    }
}
