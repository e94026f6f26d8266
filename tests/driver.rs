//! The driver's build and run sequences against a scripted toolchain.
#![cfg(test)]

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rusty_fork::rusty_fork_test;
use syqure_driver::{Driver, RunOutput, Syqure};
use syqure_pipeline::{
    error::PipelineError,
    interface::UNKNOWN_ERROR_MESSAGE,
    settings::{CompileOptions, CompilerSettings, OptimisationLevel},
};
use syqure_utils::stream::CompilerOutputStream;

use crate::{
    identity, strip_ansi,
    toolchain::{FailAt, Script, ScriptedToolchain},
};

fn settings(quiet: bool) -> CompilerSettings {
    let mut settings = CompilerSettings::new("/opt/codon/bin/codon", "prog.codon");
    settings.plugins = vec!["sequre".to_string()];
    settings.libs = vec!["libextra.so".to_string()];
    settings.quiet = quiet;
    settings
}

fn program_script() -> Script {
    Script {
        diagnostics: "warning: unused variable\n".to_string(),
        program_stdout: "hello\n".to_string(),
        program_stderr: "warn\n".to_string(),
        fail: None,
    }
}

rusty_fork_test! {
    #[test]
    fn run_walks_the_session_in_order() {
        let toolchain = ScriptedToolchain::new(program_script());
        let mut driver = Driver::new(toolchain.clone());

        let result = driver.run(&settings(true), &["--party".to_string(), "0".to_string()]);

        assert!(result.is_success());
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "warn\n");
        assert_eq!(result.output_path, None);

        assert_eq!(
            toolchain.journal().calls,
            [
                "create debug",
                "plugin sequre",
                "parse prog.codon",
                "compile",
                "run prog.codon --party 0 | libextra.so",
            ]
        );
    }

    #[test]
    fn quiet_runs_only_hide_compiler_diagnostics() {
        let stderr_before = identity(libc::STDERR_FILENO);
        let toolchain = ScriptedToolchain::new(program_script());

        let result = Driver::new(toolchain.clone()).run(&settings(true), &[]);
        let journal = toolchain.journal();

        assert_eq!(journal.compile_stderr_discarded, Some(true));
        assert_eq!(journal.run_stderr_discarded, Some(false));
        assert!(!result.stderr.contains("unused variable"));
        assert_eq!(identity(libc::STDERR_FILENO), stderr_before);
    }

    #[test]
    fn verbose_runs_leave_diagnostics_visible() {
        let toolchain = ScriptedToolchain::new(program_script());

        let result = Driver::new(toolchain.clone()).run(&settings(false), &[]);

        assert!(result.is_success());
        assert_eq!(toolchain.journal().compile_stderr_discarded, Some(false));
        // Diagnostics are written before capturing starts.
        assert_eq!(result.stderr, "warn\n");
    }

    #[test]
    fn failed_programs_keep_their_output() {
        let mut script = program_script();
        script.fail = Some((FailAt::Run, "division by zero".to_string()));

        let stdout_before = identity(libc::STDOUT_FILENO);
        let result = Driver::new(ScriptedToolchain::new(script)).run(&settings(true), &[]);

        assert_eq!(result.status, 1);
        assert_eq!(result.error_message(), "division by zero");
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "warn\n");
        assert_eq!(identity(libc::STDOUT_FILENO), stdout_before);
    }

    #[test]
    fn compile_failures_stop_before_running() {
        let mut script = program_script();
        script.fail = Some((FailAt::Parse, "unexpected token".to_string()));

        let stderr_before = identity(libc::STDERR_FILENO);
        let toolchain = ScriptedToolchain::new(script);
        let result = Driver::new(toolchain.clone()).run(&settings(true), &[]);

        assert_eq!(result.status, 1);
        assert_eq!(result.error_message(), "unexpected token");
        assert_eq!(result.stdout, "");
        assert_eq!(toolchain.journal().calls.last().map(String::as_str), Some("parse prog.codon"));
        assert_eq!(identity(libc::STDERR_FILENO), stderr_before);
    }

    #[test]
    fn silent_failures_get_a_generic_message() {
        let mut script = program_script();
        script.fail = Some((FailAt::Compile, String::new()));

        let result = Driver::new(ScriptedToolchain::new(script)).run(&settings(true), &[]);

        assert_eq!(result.error_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn uncaptured_runs_write_straight_through() {
        let toolchain = ScriptedToolchain::new(program_script());
        let result = Driver::new(toolchain).with_capture(false).run(&settings(true), &[]);

        assert!(result.is_success());
        assert_eq!(result.stdout, "");
        assert_eq!(result.stderr, "");
    }

    #[test]
    fn nonblocking_drivers_capture_the_same_output() {
        let toolchain = ScriptedToolchain::new(program_script());
        let result =
            Driver::new(toolchain).with_nonblocking_reads(true).run(&settings(true), &[]);

        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "warn\n");
    }

    #[test]
    fn build_exe_writes_the_executable() {
        let toolchain = ScriptedToolchain::new(program_script());
        let mut settings = settings(true);
        settings.optimisation_level = OptimisationLevel::Release;
        settings.standalone = true;

        let result = Driver::new(toolchain.clone()).build_exe(&settings, Path::new("out/prog"));

        assert!(result.is_success());
        assert_eq!(result.output_path, Some(PathBuf::from("out/prog")));
        assert_eq!(result.stdout, "");
        assert_eq!(
            toolchain.journal().calls,
            [
                "create release",
                "plugin sequre",
                "parse prog.codon",
                "compile",
                "link out/prog shared=false",
            ]
        );
    }

    #[test]
    fn build_exe_reports_link_failures() {
        let mut script = program_script();
        script.fail = Some((FailAt::Link, "undefined symbol: seq_main".to_string()));

        let result = Driver::new(ScriptedToolchain::new(script)).build_exe(&settings(true), Path::new("prog"));

        assert_eq!(result.status, 1);
        assert_eq!(result.error_message(), "undefined symbol: seq_main");
        assert_eq!(result.output_path, None);
    }

    #[test]
    fn facade_runs_existing_sources() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prog.codon");
        std::fs::write(&source, "print('hello')\n").unwrap();

        let options = CompileOptions {
            codon_path: dir.path().join("install"),
            program_args: vec!["1".to_string()],
            clean_sockets: false,
            ..CompileOptions::default()
        };

        let toolchain = ScriptedToolchain::new(program_script());
        let mut syqure = Syqure::with_toolchain(options, toolchain.clone());

        let output = syqure.compile_and_maybe_run(&source).unwrap();
        assert_eq!(output, RunOutput::new("hello\n".to_string(), "warn\n".to_string(), None));

        let calls = toolchain.journal().calls;
        assert_eq!(calls[1], "plugin sequre");
        assert!(calls[4].starts_with(&format!("run {} 1", source.display())));
    }

    #[test]
    fn facade_builds_next_to_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prog.codon");
        std::fs::write(&source, "print('hello')\n").unwrap();

        let options = CompileOptions {
            codon_path: dir.path().join("install"),
            run_after_build: false,
            clean_sockets: false,
            ..CompileOptions::default()
        };

        let mut syqure = Syqure::with_toolchain(options, ScriptedToolchain::new(program_script()));
        let output = syqure.compile_and_maybe_run(&source).unwrap();

        assert_eq!(output.output_path, Some(dir.path().join("prog")));
        assert_eq!(output.stdout, "");
    }

    #[test]
    fn facade_failures_carry_the_program_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prog.codon");
        std::fs::write(&source, "").unwrap();

        let mut script = program_script();
        script.fail = Some((FailAt::Run, "division by zero".to_string()));

        let options = CompileOptions { clean_sockets: false, ..CompileOptions::default() };
        let mut syqure = Syqure::with_toolchain(options, ScriptedToolchain::new(script));

        let error = syqure.compile_and_maybe_run(&source).unwrap_err();
        assert_eq!(error.captured_output(), Some(("hello\n", "warn\n")));

        let stream = CompilerOutputStream::owned();
        error.report(stream.clone());
        assert_eq!(strip_ansi(&stream.contents().unwrap()), "error: codon run failed: division by zero\n");
        assert!(matches!(error, PipelineError::RunFailed { .. }));
    }
}
