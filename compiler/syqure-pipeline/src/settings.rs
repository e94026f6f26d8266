//! Settings and configurations that are applied to a single build.
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::fs::default_codon_path;

/// The plugin that is loaded unless the options name another one.
pub const DEFAULT_PLUGIN: &str = "sequre";

/// Optimisation passes that are disabled by default, they interfere with the
/// code that the Sequre plugin generates.
pub const DEFAULT_DISABLED_PASSES: &[&str] = &["core-pythonic-list-addition-opt"];

/// What optimisation level the toolchain should compile at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimisationLevel {
    /// Build as fast as possible, with debug information.
    #[default]
    Debug,

    /// Optimise the given program as much as possible.
    Release,
}

impl OptimisationLevel {
    pub fn is_release(&self) -> bool {
        matches!(self, Self::Release)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

impl From<bool> for OptimisationLevel {
    /// `true` selects [`OptimisationLevel::Release`].
    fn from(release: bool) -> Self {
        if release { Self::Release } else { Self::Debug }
    }
}

impl Display for OptimisationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a toolchain needs to know to compile one input, either to run
/// it or to write it out as an executable.
#[derive(Debug, Clone)]
pub struct CompilerSettings {
    /// Path of the toolchain binary, also used as `argv[0]` when linking.
    pub argv0: PathBuf,

    /// The source file to compile.
    pub input: PathBuf,

    /// Plugins that are loaded before parsing, by name or path.
    pub plugins: Vec<String>,

    /// Names of optimisation passes to disable.
    pub disabled_passes: Vec<String>,

    /// Additional libraries to load or link.
    pub libs: Vec<String>,

    /// Extra flags that are passed verbatim to the linker.
    pub linker_flags: String,

    pub optimisation_level: OptimisationLevel,

    /// Whether the program is compiled as a standalone executable rather than
    /// for running in-process.
    pub standalone: bool,

    /// Whether the executable is written out as a shared library.
    pub shared_lib: bool,

    /// Whether the diagnostic stream is suppressed while compiling.
    pub quiet: bool,

    /// Directory of the standard library the toolchain should use.
    pub stdlib_path: Option<PathBuf>,

    /// Directory the toolchain looks plugins up in.
    pub plugin_path: Option<PathBuf>,
}

impl CompilerSettings {
    /// Create a new [CompilerSettings] for the given toolchain binary and
    /// input, with everything else defaulted.
    pub fn new(argv0: impl Into<PathBuf>, input: impl Into<PathBuf>) -> Self {
        Self {
            argv0: argv0.into(),
            input: input.into(),
            plugins: Vec::new(),
            disabled_passes: Vec::new(),
            libs: Vec::new(),
            linker_flags: String::new(),
            optimisation_level: OptimisationLevel::default(),
            standalone: false,
            shared_lib: false,
            quiet: false,
            stdlib_path: None,
            plugin_path: None,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

/// Options that control how the `Syqure` facade invokes the toolchain, the
/// user facing counterpart of [CompilerSettings].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// The toolchain installation.
    pub codon_path: PathBuf,

    /// The plugin to load, by name or path.
    pub plugin: String,

    pub disable_passes: Vec<String>,

    pub release: bool,

    /// If false, only build (no run).
    pub run_after_build: bool,

    /// Extra program arguments to pass after compilation.
    pub program_args: Vec<String>,

    /// Additional libraries to link (rare).
    pub libs: Vec<String>,

    /// Extra linker flags (rare).
    pub linker_flags: String,

    /// Suppress compiler warnings.
    pub quiet: bool,

    /// Where to write the executable when only building. Derived from the
    /// source path when [`None`].
    pub output_path: Option<PathBuf>,

    /// Whether stale `sock.*` files from earlier runs are removed from the
    /// working directory before compiling.
    pub clean_sockets: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            codon_path: default_codon_path(),
            plugin: DEFAULT_PLUGIN.to_string(),
            disable_passes: DEFAULT_DISABLED_PASSES.iter().map(|pass| pass.to_string()).collect(),
            release: false,
            run_after_build: true,
            program_args: Vec::new(),
            libs: Vec::new(),
            linker_flags: String::new(),
            quiet: true,
            output_path: None,
            clean_sockets: true,
        }
    }
}
