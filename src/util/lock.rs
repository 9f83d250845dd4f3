//! Per-package install locks.
//!
//! Two simultaneous installs of the *same* package must serialize so their
//! prefix writes never interleave; installs of different packages use
//! different lock files and proceed independently. The lock is an advisory
//! `flock` on `cellar/<name>.lock`, held from fetch through launcher write
//! (and during uninstall), released on drop.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use fs2::FileExt;

/// An exclusive lock scoped to one package name.
///
/// Blocks until the lock is available. Released when dropped.
#[derive(Debug)]
pub struct PackageLock {
    file: File,
}

impl PackageLock {
    /// Acquire the lock at `path`, blocking until it is free.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("failed to open lock file: {}", path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("failed to lock {}", path.display()))?;

        tracing::debug!("acquired install lock: {}", path.display());
        Ok(PackageLock { file })
    }
}

impl Drop for PackageLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
