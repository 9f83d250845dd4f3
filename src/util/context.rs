//! Global context for Cask operations.
//!
//! Centralizes the directory layout everything else builds paths from:
//!
//! ```text
//! ~/.cask/
//! ├── cellar/<name>/<version>/   # isolation prefixes, one per package
//! ├── cellar/<name>.lock         # per-package install locks
//! ├── bin/                       # generated launchers (put this on PATH)
//! └── tmp/                       # staging area for in-flight unpacks
//! ```
//!
//! The home directory can be overridden with the `CASK_HOME` environment
//! variable, which is also how tests isolate themselves.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Project directories for Cask
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "cask", "cask"));

/// Global context containing the directory layout.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Home directory for all Cask data (~/.cask/ or $CASK_HOME)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        if let Some(home) = std::env::var_os("CASK_HOME") {
            return Ok(GlobalContext {
                home: PathBuf::from(home),
            });
        }

        let home = if let Some(dirs) = PROJECT_DIRS.as_ref() {
            dirs.data_dir().to_path_buf()
        } else {
            // Fallback to ~/.cask
            std::env::var_os("HOME")
                .map(|h| PathBuf::from(h).join(".cask"))
                .context("cannot determine a home directory for cask")?
        };

        Ok(GlobalContext { home })
    }

    /// Create a GlobalContext rooted at a specific home directory.
    pub fn with_home(home: PathBuf) -> Self {
        GlobalContext { home }
    }

    /// Get the Cask home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the cellar directory holding all isolation prefixes.
    pub fn cellar_dir(&self) -> PathBuf {
        self.home.join("cellar")
    }

    /// Get the isolation prefix for one package version.
    pub fn prefix_dir(&self, name: &str, version: &str) -> PathBuf {
        self.cellar_dir().join(name).join(version)
    }

    /// Get the directory all versions of a package live under.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.cellar_dir().join(name)
    }

    /// Get the lock file path guarding installs of a package.
    pub fn lock_path(&self, name: &str) -> PathBuf {
        self.cellar_dir().join(format!("{}.lock", name))
    }

    /// Get the directory generated launchers are written to.
    pub fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    /// Get the staging directory for in-flight unpacks.
    ///
    /// Lives under the same home as the cellar so the final rename into
    /// place stays on one filesystem.
    pub fn staging_dir(&self) -> PathBuf {
        self.home.join("tmp")
    }
}
