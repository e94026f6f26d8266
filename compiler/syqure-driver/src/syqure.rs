//! The high level entry point: compile a Sequre program with the Codon
//! toolchain and either run it or build an executable from it.
use std::{
    env,
    path::{Path, PathBuf},
};

use derive_more::Constructor;
use syqure_pipeline::{
    error::PipelineError,
    fs::{CodonInstall, clean_sockets, default_output_path},
    interface::Toolchain,
    result::BuildResult,
    settings::{CompileOptions, CompilerSettings, OptimisationLevel},
};

use crate::{codon::CodonCli, driver::Driver};

/// What a successful [Syqure::compile_and_maybe_run] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Constructor)]
pub struct RunOutput {
    /// Everything the program wrote to `stdout`, empty when only building.
    pub stdout: String,

    /// Everything the program wrote to `stderr`, empty when only building.
    pub stderr: String,

    /// The executable that was written, when only building.
    pub output_path: Option<PathBuf>,
}

/// Compiles and runs Codon sources with a plugin (Sequre by default).
pub struct Syqure<T: Toolchain = CodonCli> {
    options: CompileOptions,
    install: CodonInstall,
    driver: Driver<T>,
}

impl Syqure<CodonCli> {
    /// Use the `codon` binary of the installation named by the options.
    pub fn new(options: CompileOptions) -> Self {
        let install = CodonInstall::resolve(&options.codon_path);
        let toolchain = CodonCli::new(install.binary.clone());
        Self::with_install(options, install, toolchain)
    }
}

impl<T: Toolchain> Syqure<T> {
    pub fn with_toolchain(options: CompileOptions, toolchain: T) -> Self {
        let install = CodonInstall::resolve(&options.codon_path);
        Self::with_install(options, install, toolchain)
    }

    fn with_install(options: CompileOptions, install: CodonInstall, toolchain: T) -> Self {
        Self { options, install, driver: Driver::new(toolchain) }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn install(&self) -> &CodonInstall {
        &self.install
    }

    /// The version of the underlying compiler.
    pub fn version(&self) -> String {
        self.driver.version()
    }

    /// Compile `source` and run it, or only build it when the options say
    /// so. A build writes to the configured output path, or next to the
    /// source with its extension removed.
    pub fn compile_and_maybe_run(&mut self, source: impl AsRef<Path>) -> Result<RunOutput, PipelineError> {
        let source = source.as_ref();

        if !source.exists() {
            return Err(PipelineError::SourceNotFound(source.to_path_buf()));
        }

        if self.options.clean_sockets {
            let removed = clean_sockets(&env::current_dir()?);

            if removed > 0 {
                log::debug!("removed {removed} stale socket file(s)");
            }
        }

        if self.options.run_after_build {
            let settings = self.settings(source, false);
            let result = self.driver.run(&settings, &self.options.program_args);

            return match result {
                BuildResult { status: 0, stdout, stderr, .. } => Ok(RunOutput::new(stdout, stderr, None)),
                failed => Err(PipelineError::RunFailed {
                    message: failed.error_message().to_string(),
                    stdout: failed.stdout,
                    stderr: failed.stderr,
                }),
            };
        }

        let output = self.options.output_path.clone().unwrap_or_else(|| default_output_path(source));
        let settings = self.settings(source, true);
        let result = self.driver.build_exe(&settings, &output);

        if result.is_success() {
            Ok(RunOutput::new(String::new(), String::new(), result.output_path))
        } else {
            Err(PipelineError::BuildFailed { message: result.error_message().to_string() })
        }
    }

    /// The settings of a build of `source`.
    pub fn settings(&self, source: &Path, standalone: bool) -> CompilerSettings {
        let options = &self.options;
        let mut settings = CompilerSettings::new(self.install.binary.clone(), source);

        settings.plugins = vec![self.install.resolve_plugin(&options.plugin)];
        settings.disabled_passes = options.disable_passes.clone();
        settings.libs = options.libs.clone();
        settings.linker_flags = options.linker_flags.clone();
        settings.optimisation_level = OptimisationLevel::from(options.release);
        settings.standalone = standalone;
        settings.quiet = options.quiet;
        settings.stdlib_path = Some(self.install.stdlib.clone());
        settings.plugin_path = Some(self.install.plugin_search_path());

        settings
    }
}
