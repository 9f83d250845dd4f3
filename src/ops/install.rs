//! The install pipeline.
//!
//! An [`Installer`] drives one plan through
//! `Pending -> Fetched -> Verified -> Unpacked -> LauncherWritten -> Installed`,
//! in strict sequence; the first failing step moves it to the terminal
//! `Failed` state and nothing after it runs. The prefix is only ever
//! touched by the final stage-and-swap of `unpack`, so a failed install
//! leaves the filesystem exactly as it was.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::core::errors::InstallError;
use crate::core::manifest::PackageManifest;
use crate::core::plan::{resolve, InstallationPlan};
use crate::ops::extract;
use crate::util::context::GlobalContext;
use crate::util::lock::PackageLock;
use crate::util::{fetch, fs, hash, process};

/// Pipeline state of one install operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Pending,
    Fetched,
    Verified,
    Unpacked,
    LauncherWritten,
    Installed,
    Failed,
}

/// Result of a successful install.
#[derive(Debug)]
pub struct InstallReport {
    /// Package name
    pub package: String,

    /// Version component of the prefix (`1.0.0` or `head`)
    pub version_label: String,

    /// Isolation prefix the files landed in
    pub prefix: PathBuf,

    /// Launcher path on the command search path
    pub launcher_path: PathBuf,

    /// Files placed in the prefix, relative to it
    pub installed_files: Vec<PathBuf>,

    /// Non-fatal findings (missing runtime dependencies, ...)
    pub warnings: Vec<String>,
}

/// Executes installation plans.
pub struct Installer<'a> {
    ctx: &'a GlobalContext,
    fetch_timeout: Duration,
    state: InstallState,
}

impl<'a> Installer<'a> {
    /// Create an installer with the given fetch timeout.
    pub fn new(ctx: &'a GlobalContext, fetch_timeout: Duration) -> Self {
        Installer {
            ctx,
            fetch_timeout,
            state: InstallState::Pending,
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Run the full pipeline: resolve, then fetch -> verify -> unpack ->
    /// write launcher, under the package's install lock.
    ///
    /// Missing runtime dependencies are reported as warnings on the
    /// returned report, never as failures - provisioning them belongs to
    /// an external package manager.
    pub fn install(
        &mut self,
        manifest: &PackageManifest,
        use_head: bool,
    ) -> Result<InstallReport, InstallError> {
        let plan = resolve(manifest, self.ctx, use_head)?;

        let _lock = PackageLock::acquire(&self.ctx.lock_path(&plan.package))
            .map_err(InstallError::Other)?;

        match self.run_pipeline(&plan) {
            Ok(report) => Ok(report),
            Err(e) => {
                let reached = self.state;
                self.state = InstallState::Failed;
                tracing::debug!(
                    "install of `{}` failed after reaching {:?}: {}",
                    plan.package,
                    reached,
                    e
                );
                Err(e)
            }
        }
    }

    fn run_pipeline(&mut self, plan: &InstallationPlan) -> Result<InstallReport, InstallError> {
        let bytes = self.fetch(plan)?;
        self.state = InstallState::Fetched;

        self.verify(plan, &bytes)?;
        self.state = InstallState::Verified;

        let installed_files = self.unpack(plan, &bytes)?;
        self.state = InstallState::Unpacked;

        self.write_launcher(plan)?;
        self.state = InstallState::LauncherWritten;

        let warnings = check_dependencies(&plan.depends_on);
        self.state = InstallState::Installed;

        tracing::info!(
            "installed `{}` {} to {}",
            plan.package,
            plan.version_label,
            plan.prefix.display()
        );

        Ok(InstallReport {
            package: plan.package.clone(),
            version_label: plan.version_label.clone(),
            prefix: plan.prefix.clone(),
            launcher_path: plan.launcher_path.clone(),
            installed_files,
            warnings,
        })
    }

    /// Fetch the archive bytes for a plan.
    pub fn fetch(&self, plan: &InstallationPlan) -> Result<Vec<u8>, InstallError> {
        fetch::fetch_archive(&plan.archive_url, self.fetch_timeout)
    }

    /// Verify archive bytes against the plan's expected digest.
    ///
    /// Advisory (head) plans skip verification entirely: the archive
    /// tracks a moving branch and no fixed digest can hold.
    pub fn verify(&self, plan: &InstallationPlan, bytes: &[u8]) -> Result<(), InstallError> {
        if plan.verify_advisory {
            tracing::debug!(
                "skipping verification for `{}`: head install",
                plan.package
            );
            return Ok(());
        }

        let expected = plan
            .expected_sha256
            .as_deref()
            .ok_or_else(|| InstallError::ManifestIncomplete {
                package: plan.package.clone(),
                field: "sha256",
                reason: "plan carries no digest".to_string(),
            })?;

        let actual = hash::sha256_bytes(bytes);
        if !hash::digest_matches(expected, &actual) {
            return Err(InstallError::Integrity {
                url: plan.archive_url.clone(),
                expected: expected.to_string(),
                actual,
            });
        }

        tracing::debug!("digest verified: {}", &actual[..16]);
        Ok(())
    }

    /// Unpack verified archive bytes into the plan's prefix.
    ///
    /// Extraction goes into a staging directory under the cask home; the
    /// prefix is replaced in a single rename only once the whole archive
    /// extracted cleanly. Returns the installed files, relative to the
    /// prefix.
    pub fn unpack(
        &self,
        plan: &InstallationPlan,
        bytes: &[u8],
    ) -> Result<Vec<PathBuf>, InstallError> {
        let staging_root = self.ctx.staging_dir();
        fs::ensure_dir(&staging_root).map_err(InstallError::Other)?;

        let staging = tempfile::Builder::new()
            .prefix(&format!("{}-", plan.package))
            .tempdir_in(&staging_root)
            .map_err(|e| InstallError::Extraction {
                reason: format!("failed to create staging directory: {}", e),
            })?;

        extract::extract_archive(bytes, staging.path(), &plan.install)?;
        let installed_files = extract::list_files(staging.path());

        fs::swap_dir_into_place(staging.path(), &plan.prefix).map_err(InstallError::Other)?;

        // The staged directory was renamed away; nothing left to clean up.
        let _ = staging.close();

        Ok(installed_files)
    }

    /// Render and atomically write the launcher for a plan.
    pub fn write_launcher(&self, plan: &InstallationPlan) -> Result<(), InstallError> {
        fs::write_executable_atomic(&plan.launcher_path, &plan.launcher.contents)
            .map_err(InstallError::Other)?;

        tracing::debug!("wrote launcher: {}", plan.launcher_path.display());
        Ok(())
    }
}

/// Check that each declared runtime dependency resolves on PATH.
///
/// Absence is a warning, not an error.
fn check_dependencies(depends_on: &[String]) -> Vec<String> {
    let mut warnings = Vec::new();
    for dep in depends_on {
        if process::find_executable(dep).is_none() {
            warnings.push(format!(
                "runtime dependency `{}` not found on PATH; install it with your package manager",
                dep
            ));
        }
    }
    warnings
}

/// Post-install smoke test: `<launcher> version` must mention the product.
pub fn smoke_test(launcher: &Path, expect: &str) -> Result<()> {
    let stdout = process::capture_stdout(launcher, "version")
        .with_context(|| format!("smoke test failed for {}", launcher.display()))?;

    if !stdout.contains(expect) {
        bail!(
            "smoke test failed: `{} version` output did not contain \"{}\"",
            launcher.display(),
            expect
        );
    }

    Ok(())
}
