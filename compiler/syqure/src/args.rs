//! Command line options of the `syqure` binary.
use std::path::PathBuf;

use clap::Parser;
use syqure_pipeline::settings::{CompileOptions, DEFAULT_PLUGIN};

/// Compile and run Codon/Sequre programs.
#[derive(Parser, Debug)]
#[command(name = "syqure", version, about = "Compile and run Codon/Sequre programs")]
pub struct CompilerOptions {
    /// Path to the .codon source file
    pub source: PathBuf,

    /// Compile in release mode
    #[arg(long)]
    pub release: bool,

    /// Only build; do not run the resulting binary
    #[arg(long)]
    pub build_only: bool,

    /// Path to Codon installation (defaults to CODON_PATH or ./codon/install)
    #[arg(long, env = "CODON_PATH")]
    pub codon_path: Option<PathBuf>,

    /// The plugin to load, by name or path
    #[arg(long, default_value = DEFAULT_PLUGIN)]
    pub plugin: String,

    /// Disable an optimisation pass, in addition to the default ones
    #[arg(long = "disable-opt", value_name = "PASS")]
    pub disable_opts: Vec<String>,

    /// Additional library to link
    #[arg(long = "lib", value_name = "LIB")]
    pub libs: Vec<String>,

    /// Extra flags for the linker
    #[arg(long, default_value = "")]
    pub linker_flags: String,

    /// Where to write the executable when only building
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Show compiler warnings
    #[arg(long)]
    pub verbose: bool,

    /// Log what the driver does
    #[arg(long)]
    pub debug: bool,

    /// Analyse the source statically instead of compiling it
    #[arg(long)]
    pub analyze: bool,

    /// Print the analysis as JSON
    #[arg(long, requires = "analyze")]
    pub json: bool,

    /// Print the version of the Codon compiler before compiling
    #[arg(long)]
    pub version_info: bool,

    /// Program arguments passed to the compiled Codon binary
    #[arg(last = true)]
    pub program_args: Vec<String>,
}

impl From<CompilerOptions> for CompileOptions {
    fn from(options: CompilerOptions) -> Self {
        let mut compile = CompileOptions::default();

        if let Some(path) = options.codon_path {
            compile.codon_path = path;
        }

        compile.plugin = options.plugin;
        compile.disable_passes.extend(options.disable_opts);
        compile.release = options.release;
        compile.run_after_build = !options.build_only;
        compile.program_args = options.program_args;
        compile.libs = options.libs;
        compile.linker_flags = options.linker_flags;
        compile.quiet = !options.verbose;
        compile.output_path = options.output;

        compile
    }
}
