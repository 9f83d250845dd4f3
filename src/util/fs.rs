//! Filesystem utilities.
//!
//! All writes that can be observed by a concurrently running launcher go
//! through the stage-then-rename helpers here: content is fully written to
//! a sibling temporary path first and only then renamed into place.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file, if it exists.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
    }
    Ok(())
}

/// Atomically write an executable file.
///
/// Writes to a temporary file in the target's directory, marks it
/// executable, then renames over `path`. A reader that raced the write
/// sees either the old file or the new one, never a partial script.
pub fn write_executable_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent directory: {}", path.display()))?;
    ensure_dir(dir)?;

    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    fs::write(tmp.path(), contents)
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;

    set_executable(tmp.path())?;

    tmp.persist(path)
        .with_context(|| format!("failed to move launcher into place: {}", path.display()))?;

    Ok(())
}

/// Mark a file executable (no-op on non-unix).
pub fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o755);
        fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Replace `dest` with the directory at `staged`.
///
/// The staged directory must live on the same filesystem as `dest`. Any
/// prior contents of `dest` are moved aside first and only deleted after
/// the new tree has been renamed into place, so a failure part-way leaves
/// either the old install or the new one, never a mix.
pub fn swap_dir_into_place(staged: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    // Not `with_extension`: version-like names (`1.0.0`) would lose their
    // last dotted component.
    let file_name = dest
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("invalid destination path: {}", dest.display()))?;
    let old = dest.with_file_name(format!("{}.replaced", file_name.to_string_lossy()));
    remove_dir_all_if_exists(&old)?;

    let had_prior = dest.exists();
    if had_prior {
        fs::rename(dest, &old)
            .with_context(|| format!("failed to move aside prior install: {}", dest.display()))?;
    }

    if let Err(e) = fs::rename(staged, dest) {
        // Roll the prior install back before surfacing the error
        if had_prior {
            let _ = fs::rename(&old, dest);
        }
        return Err(e).with_context(|| {
            format!(
                "failed to move staged directory {} to {}",
                staged.display(),
                dest.display()
            )
        });
    }

    if had_prior {
        remove_dir_all_if_exists(&old)?;
    }

    Ok(())
}
