//! The `syqure` binary: compiles a Sequre program with the Codon toolchain
//! and runs it, or only builds it, or analyses it statically.

mod args;

use std::{panic, process};

use clap::Parser;
use log::LevelFilter;
use syqure_analysis::{AnalysisError, analyze_file, report::write_report};
use syqure_driver::{RunOutput, Syqure};
use syqure_pipeline::settings::CompileOptions;
use syqure_utils::{
    crash::crash_handler, highlight::report_error, logging::CompilerLogger,
    stream::CompilerOutputStream, stream_write, stream_writeln,
};

use crate::args::CompilerOptions;

pub static CONSOLE_LOGGER: CompilerLogger = CompilerLogger::new();

/// Write the output of a program back out to where it would have gone.
fn replay(stdout: &str, stderr: &str) {
    stream_write!(CompilerOutputStream::stdout(), "{stdout}");
    stream_write!(CompilerOutputStream::stderr(), "{stderr}");
}

fn analyze(options: &CompilerOptions) -> Result<(), AnalysisError> {
    let analysis = analyze_file(&options.source)?;

    if options.json {
        stream_writeln!(CompilerOutputStream::stdout(), "{}", analysis.to_json()?);
    } else {
        write_report(&analysis, CompilerOutputStream::stdout());
    }

    Ok(())
}

fn main() {
    panic::set_hook(Box::new(crash_handler));

    let options = CompilerOptions::parse();
    let level = if options.debug { LevelFilter::Debug } else { LevelFilter::Warn };

    if let Err(error) =
        CONSOLE_LOGGER.install(CompilerOutputStream::stdout(), CompilerOutputStream::stderr(), level)
    {
        eprintln!("couldn't initialise the logger: {error}");
    }

    if options.analyze {
        if let Err(error) = analyze(&options) {
            report_error(CompilerOutputStream::stderr(), error);
            process::exit(1);
        }

        return;
    }

    let show_version = options.version_info;
    let source = options.source.clone();
    let mut syqure = Syqure::new(CompileOptions::from(options));

    if show_version {
        stream_writeln!(CompilerOutputStream::stdout(), "codon {}", syqure.version());
    }

    log::debug!("using the installation at `{}`", syqure.install().root.display());

    match syqure.compile_and_maybe_run(&source) {
        Ok(RunOutput { stdout, stderr, output_path }) => {
            replay(&stdout, &stderr);

            if let Some(path) = output_path {
                stream_writeln!(CompilerOutputStream::stdout(), "Built executable at {}", path.display());
            }
        }
        Err(error) => {
            if let Some((stdout, stderr)) = error.captured_output() {
                replay(stdout, stderr);
            }

            error.report_and_exit();
        }
    }
}
