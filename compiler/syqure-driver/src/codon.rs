//! A [Toolchain] backed by the `codon` command-line compiler.
//!
//! Compiling builds the program into a scratch directory owned by the
//! session, which is removed along with the session.
//! Running executes the built artifact as a child that inherits the
//! standard streams, so whatever the driver has done to them (suppressing or
//! capturing) applies to the program too.
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Output},
};

use tempfile::TempDir;

use syqure_pipeline::{
    fs::{CODON_PATH_VAR, CODON_PLUGIN_PATH_VAR},
    interface::{CompilerSession, LinkOptions, Toolchain, ToolchainError, ToolchainResult},
    settings::CompilerSettings,
};

/// The `codon` compiler binary of an installation.
#[derive(Debug, Clone)]
pub struct CodonCli {
    binary: PathBuf,
}

impl CodonCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Toolchain for CodonCli {
    type Session = CodonSession;

    fn version(&self) -> String {
        match Command::new(&self.binary).arg("--version").output() {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            Ok(output) => {
                log::debug!("`{} --version` exited with {}", self.binary.display(), output.status);
                "unknown".to_string()
            }
            Err(error) => {
                log::debug!("couldn't run `{}`: {error}", self.binary.display());
                "unknown".to_string()
            }
        }
    }

    fn create_session(&self, settings: &CompilerSettings) -> Self::Session {
        CodonSession::new(self.binary.clone(), settings.clone())
    }
}

/// One `codon build` invocation and the artifact it produces.
#[derive(Debug)]
pub struct CodonSession {
    binary: PathBuf,
    settings: CompilerSettings,
    plugins: Vec<String>,
    input: Option<PathBuf>,
    artifact: Option<PathBuf>,

    /// Where the artifact is built, created on the first compile.
    scratch: Option<TempDir>,
}

impl CodonSession {
    fn new(binary: PathBuf, settings: CompilerSettings) -> Self {
        Self { binary, settings, plugins: Vec::new(), input: None, artifact: None, scratch: None }
    }

    /// The arguments of the `codon build` invocation that writes the
    /// program for `input` to `artifact`.
    pub fn build_args(&self, input: &Path, artifact: &Path) -> Vec<String> {
        let settings = &self.settings;
        let mut args = vec!["build".to_string()];

        args.push(if settings.optimisation_level.is_release() { "-release" } else { "-debug" }.into());

        for plugin in &self.plugins {
            args.extend(["-plugin".to_string(), plugin.clone()]);
        }

        for pass in &settings.disabled_passes {
            args.extend(["-disable-opt".to_string(), pass.clone()]);
        }

        for lib in &settings.libs {
            args.extend(["-l".to_string(), lib.clone()]);
        }

        if !settings.linker_flags.is_empty() {
            args.extend(["-linker-flags".to_string(), settings.linker_flags.clone()]);
        }

        if settings.shared_lib {
            args.push("-lib".to_string());
        }

        args.extend([
            "-o".to_string(),
            artifact.to_string_lossy().into_owned(),
            input.to_string_lossy().into_owned(),
        ]);

        args
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);

        if let Some(stdlib) = &self.settings.stdlib_path {
            command.env(CODON_PATH_VAR, stdlib);
        }

        if let Some(plugins) = &self.settings.plugin_path {
            command.env(CODON_PLUGIN_PATH_VAR, plugins);
        }

        command
    }

    fn artifact(&self) -> ToolchainResult<&Path> {
        self.artifact.as_deref().ok_or_else(|| ToolchainError::other("the program hasn't been compiled"))
    }

    /// Where the artifact built for `input` goes.
    fn scratch_artifact(&mut self, input: &Path) -> ToolchainResult<PathBuf> {
        let dir = match self.scratch.take() {
            Some(dir) => dir,
            None => tempfile::Builder::new().prefix("syqure-").tempdir()?,
        };

        let name = input.file_stem().map(|stem| stem.to_os_string()).unwrap_or_else(|| "program".into());
        let artifact = dir.path().join(name);

        self.scratch = Some(dir);
        Ok(artifact)
    }
}

/// Turn a failed `codon` invocation into an error that carries its
/// diagnostics.
fn failed(output: &Output) -> ToolchainError {
    let diagnostics = String::from_utf8_lossy(&output.stderr);

    if diagnostics.trim().is_empty() {
        ToolchainError::other(format!("codon exited with {}", output.status))
    } else {
        ToolchainError::parser(diagnostics.trim_end())
    }
}

impl CompilerSession for CodonSession {
    fn load_plugin(&mut self, plugin: &str) -> ToolchainResult<()> {
        let looks_like_path = plugin.contains(std::path::MAIN_SEPARATOR);

        if looks_like_path && !Path::new(plugin).exists() {
            return Err(ToolchainError::plugin(format!("plugin `{plugin}` not found")));
        }

        self.plugins.push(plugin.to_string());
        Ok(())
    }

    fn parse_file(&mut self, input: &Path) -> ToolchainResult<()> {
        if !input.is_file() {
            return Err(ToolchainError::parser(format!("couldn't read `{}`", input.display())));
        }

        self.input = Some(input.to_path_buf());
        Ok(())
    }

    fn compile(&mut self) -> ToolchainResult<()> {
        let input = self
            .input
            .clone()
            .ok_or_else(|| ToolchainError::other("no input was parsed"))?;
        let artifact = self.scratch_artifact(&input)?;

        let output = self.command().args(self.build_args(&input, &artifact)).output()?;

        // Warnings of a successful build go through the process's own stream,
        // which is where the driver suppresses them.
        if !output.stderr.is_empty() && output.status.success() {
            let _ = io::stderr().write_all(&output.stderr);
        }

        if !output.status.success() {
            return Err(failed(&output));
        }

        self.artifact = Some(artifact);
        Ok(())
    }

    fn run(&mut self, args: &[String], _libs: &[String]) -> ToolchainResult<()> {
        // Libraries were linked into the artifact when it was compiled.
        let artifact = self.artifact()?;
        let mut command = Command::new(artifact);

        if let Some((name, rest)) = args.split_first() {
            #[cfg(unix)]
            std::os::unix::process::CommandExt::arg0(&mut command, name);
            command.args(rest);
        }

        let status = command.status()?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolchainError::runtime(format!("program exited with {status}")))
        }
    }

    fn write_executable(&mut self, output: &Path, link: LinkOptions<'_>) -> ToolchainResult<()> {
        if link.shared_lib != self.settings.shared_lib {
            return Err(ToolchainError::other("the program was compiled for a different link mode"));
        }

        fs::copy(self.artifact()?, output)?;
        Ok(())
    }
}
