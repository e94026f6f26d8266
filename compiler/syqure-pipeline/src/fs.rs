//! Filesystem utilities for locating the toolchain installation, deriving
//! output paths and cleaning up after earlier runs.
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// Environment variable naming the toolchain installation.
pub const CODON_PATH_VAR: &str = "CODON_PATH";

/// Environment variable naming the directory plugins are looked up in.
pub const CODON_PLUGIN_PATH_VAR: &str = "CODON_PLUGIN_PATH";

/// Where the installation is expected when nothing else is configured,
/// relative to the working directory.
const FALLBACK_INSTALL: &str = "codon/install";

/// Source extensions that are stripped to derive the executable name.
const SOURCE_EXTENSIONS: &[&str] = &["codon", "py", "seq"];

/// Prefix of the socket files that the MPC runtime leaves behind.
const SOCKET_PREFIX: &str = "sock.";

/// The manifest that marks a directory as a plugin.
const PLUGIN_MANIFEST: &str = "plugin.toml";

/// Find the toolchain installation:
///
/// - `CODON_PATH`, when it is set,
///
/// - a `lib/codon` directory next to the running executable, which is where
///   packaged distributions put it,
///
/// - otherwise `codon/install` in the working directory.
pub fn default_codon_path() -> PathBuf {
    if let Some(path) = env::var_os(CODON_PATH_VAR) {
        return PathBuf::from(path);
    }

    if let Some(bundled) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("lib/codon")))
        .filter(|dir| dir.exists())
    {
        return bundled;
    }

    PathBuf::from(FALLBACK_INSTALL)
}

/// The layout of a toolchain installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonInstall {
    /// The directory the installation was resolved from.
    pub root: PathBuf,

    /// The compiler binary, `<root>/bin/codon`.
    pub binary: PathBuf,

    /// The standard library directory.
    pub stdlib: PathBuf,

    /// The directory plugins are installed into.
    pub plugins: PathBuf,
}

impl CodonInstall {
    /// Resolve the layout of the installation at `root`. A full installation
    /// keeps its libraries under `lib/codon`, a packaged one has them at the
    /// root directly.
    pub fn resolve(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        let nested = root.join("lib").join("codon");
        let libraries = if nested.is_dir() { nested } else { root.clone() };

        Self {
            binary: root.join("bin").join("codon"),
            stdlib: libraries.join("stdlib"),
            plugins: libraries.join("plugins"),
            root,
        }
    }

    /// The directory the toolchain should load plugins from. An explicitly
    /// configured `CODON_PLUGIN_PATH` wins over the installation.
    pub fn plugin_search_path(&self) -> PathBuf {
        env::var_os(CODON_PLUGIN_PATH_VAR).map(PathBuf::from).unwrap_or_else(|| self.plugins.clone())
    }

    /// Resolve `plugin` to an installed plugin directory if the installation
    /// has one with that name, otherwise leave it to the toolchain to find.
    pub fn resolve_plugin(&self, plugin: &str) -> String {
        resolve_plugin_path(&self.plugins, plugin)
    }
}

/// Resolve a plugin name against a plugin directory. A candidate only counts
/// when it carries a plugin manifest.
pub fn resolve_plugin_path(plugins: &Path, plugin: &str) -> String {
    let candidate = plugins.join(plugin);

    if candidate.join(PLUGIN_MANIFEST).exists() {
        candidate.to_string_lossy().into_owned()
    } else {
        plugin.to_string()
    }
}

/// The executable path for `source`: the source path itself with a known
/// source extension removed.
pub fn default_output_path(source: &Path) -> PathBuf {
    let mut path = source.to_path_buf();

    let is_source = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));

    if is_source {
        path.set_extension("");
    }

    path
}

/// Remove stale `sock.*` files anywhere below `dir`, returning how many were
/// removed. Entries that can't be read or removed are skipped, including
/// `dir` itself.
pub fn clean_sockets(dir: &Path) -> usize {
    let mut removed = 0;

    let sockets = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(SOCKET_PREFIX));

    for entry in sockets {
        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(error) => log::debug!("couldn't remove `{}`: {error}", entry.path().display()),
        }
    }

    removed
}
