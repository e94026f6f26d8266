//! The record a build hands back to its caller.
use std::path::PathBuf;

use syqure_stdio::CapturedOutput;

/// The outcome of one `run` or `build_exe` request.
///
/// A successful run carries the output the program produced, a successful
/// build carries the path of the executable it wrote. A failure carries the
/// toolchain's message and whatever the program managed to write before
/// failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    /// `0` on success, `1` on failure.
    pub status: i32,

    pub error: Option<String>,

    pub stdout: String,

    pub stderr: String,

    pub output_path: Option<PathBuf>,
}

impl BuildResult {
    /// A successful run of a program that produced `output`.
    pub fn ran(output: CapturedOutput) -> Self {
        Self { status: 0, stdout: output.stdout, stderr: output.stderr, ..Self::default() }
    }

    /// A successful build that wrote an executable to `output_path`.
    pub fn built(output_path: PathBuf) -> Self {
        Self { status: 0, output_path: Some(output_path), ..Self::default() }
    }

    /// A failed build or run.
    pub fn failure(error: impl Into<String>) -> Self {
        Self { status: 1, error: Some(error.into()), ..Self::default() }
    }

    /// Attach output that was captured before the failure.
    pub fn with_output(mut self, output: CapturedOutput) -> Self {
        self.stdout = output.stdout;
        self.stderr = output.stderr;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// The failure message, empty for successful results.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_keep_the_captured_output() {
        let output = CapturedOutput { stdout: "partial\n".to_string(), stderr: "oops\n".to_string() };
        let result = BuildResult::failure("division by zero").with_output(output);

        assert!(!result.is_success());
        assert_eq!(result.status, 1);
        assert_eq!(result.error_message(), "division by zero");
        assert_eq!(result.stdout, "partial\n");
        assert_eq!(result.stderr, "oops\n");
    }

    #[test]
    fn builds_report_their_output_path() {
        let result = BuildResult::built(PathBuf::from("prog"));

        assert!(result.is_success());
        assert_eq!(result.error_message(), "");
        assert_eq!(result.output_path, Some(PathBuf::from("prog")));
    }
}
