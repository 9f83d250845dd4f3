//! Package removal.

use crate::core::errors::InstallError;
use crate::util::context::GlobalContext;
use crate::util::fs::{remove_dir_all_if_exists, remove_file_if_exists};
use crate::util::lock::PackageLock;

/// Outcome of an uninstall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// The prefix and launcher were removed.
    Removed,

    /// Nothing was installed under this name. A no-op, not an error.
    NotInstalled,
}

/// Remove a package's cellar directory (all versions) and its launcher.
///
/// Runs under the same per-package lock as install, so an uninstall never
/// races a concurrent install of the same name. Idempotent.
pub fn uninstall(ctx: &GlobalContext, name: &str) -> Result<UninstallOutcome, InstallError> {
    let _lock = PackageLock::acquire(&ctx.lock_path(name)).map_err(InstallError::Other)?;

    let package_dir = ctx.package_dir(name);
    let launcher_path = ctx.bin_dir().join(name);

    if !package_dir.exists() && !launcher_path.exists() {
        return Ok(UninstallOutcome::NotInstalled);
    }

    // The lock file itself stays: deleting it while a waiter holds the
    // same inode open would let a later install lock a different file.
    remove_dir_all_if_exists(&package_dir).map_err(InstallError::Other)?;
    remove_file_if_exists(&launcher_path).map_err(InstallError::Other)?;

    tracing::info!("uninstalled `{}`", name);
    Ok(UninstallOutcome::Removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_uninstall_absent_package() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_home(tmp.path().to_path_buf());

        assert_eq!(
            uninstall(&ctx, "nothing").unwrap(),
            UninstallOutcome::NotInstalled
        );
        // Still a no-op the second time
        assert_eq!(
            uninstall(&ctx, "nothing").unwrap(),
            UninstallOutcome::NotInstalled
        );
    }

    #[test]
    fn test_uninstall_removes_prefix_and_launcher() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_home(tmp.path().to_path_buf());

        let prefix = ctx.prefix_dir("mytool", "1.0.0");
        std::fs::create_dir_all(prefix.join("bin")).unwrap();
        std::fs::write(prefix.join("bin/mytool"), "#!/bin/sh\n").unwrap();
        std::fs::create_dir_all(ctx.bin_dir()).unwrap();
        std::fs::write(ctx.bin_dir().join("mytool"), "#!/bin/sh\n").unwrap();

        assert_eq!(uninstall(&ctx, "mytool").unwrap(), UninstallOutcome::Removed);
        assert!(!ctx.package_dir("mytool").exists());
        assert!(!ctx.bin_dir().join("mytool").exists());

        assert_eq!(
            uninstall(&ctx, "mytool").unwrap(),
            UninstallOutcome::NotInstalled
        );
    }
}
