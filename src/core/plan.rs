//! Resolution of a manifest into a concrete installation plan.
//!
//! `resolve` is a pure function of the manifest and the context's directory
//! layout: no network, no filesystem access. All I/O happens later, in
//! `ops::install`, driven by the plan.

use std::path::PathBuf;

use crate::core::errors::InstallError;
use crate::core::launcher::Launcher;
use crate::core::manifest::{PackageManifest, PLACEHOLDER_SHA256};
use crate::util::context::GlobalContext;

/// Everything the installer needs to realize one package on disk.
///
/// Exists only for the duration of a single install operation.
#[derive(Debug, Clone)]
pub struct InstallationPlan {
    /// Package name
    pub package: String,

    /// Version component of the prefix path (`1.0.0`, or `head`)
    pub version_label: String,

    /// Resolved archive URL (release tag or head branch tarball)
    pub archive_url: String,

    /// Expected digest; `None` for advisory (head) installs
    pub expected_sha256: Option<String>,

    /// When true, integrity verification is skipped: the archive points at
    /// a moving branch and no fixed digest can hold.
    pub verify_advisory: bool,

    /// Isolation prefix this package's files land in
    pub prefix: PathBuf,

    /// Glob patterns selecting archive entries to place into the prefix
    pub install: Vec<String>,

    /// Where the launcher goes on PATH
    pub launcher_path: PathBuf,

    /// Rendered launcher script
    pub launcher: Launcher,

    /// Runtime dependencies checked (not provisioned) after install
    pub depends_on: Vec<String>,
}

/// Resolve a manifest into an [`InstallationPlan`].
///
/// With `use_head` the plan targets the manifest's development reference
/// and records that verification is advisory only. Without it, the
/// manifest's digest must be real: missing, malformed, or placeholder
/// digests fail with `ManifestIncomplete` before any I/O can happen.
pub fn resolve(
    manifest: &PackageManifest,
    ctx: &GlobalContext,
    use_head: bool,
) -> Result<InstallationPlan, InstallError> {
    let (archive_url, expected_sha256, version_label) = if use_head {
        let head = manifest.head.as_ref().ok_or_else(|| {
            InstallError::ManifestIncomplete {
                package: manifest.name.clone(),
                field: "head",
                reason: "no development reference declared".to_string(),
            }
        })?;
        (head.archive_url(), None, "head".to_string())
    } else {
        if manifest.sha256.is_empty() || manifest.sha256 == PLACEHOLDER_SHA256 {
            return Err(InstallError::ManifestIncomplete {
                package: manifest.name.clone(),
                field: "sha256",
                reason: "digest is missing or still a placeholder".to_string(),
            });
        }
        if !manifest.has_usable_digest() {
            return Err(InstallError::ManifestIncomplete {
                package: manifest.name.clone(),
                field: "sha256",
                reason: format!("`{}` is not a 64-char hex digest", manifest.sha256),
            });
        }
        (
            manifest.url.clone(),
            Some(manifest.sha256.to_ascii_lowercase()),
            manifest.version.to_string(),
        )
    };

    let prefix = ctx.prefix_dir(&manifest.name, &version_label);
    let launcher_path = ctx.bin_dir().join(&manifest.name);
    let launcher = Launcher::render(&manifest.name, &prefix)?;

    Ok(InstallationPlan {
        package: manifest.name.clone(),
        version_label,
        archive_url,
        expected_sha256,
        verify_advisory: use_head,
        prefix,
        install: manifest.install.clone(),
        launcher_path,
        launcher,
        depends_on: manifest.depends_on.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::HeadRef;
    use semver::Version;
    use tempfile::TempDir;

    fn manifest_with_digest(sha256: &str) -> PackageManifest {
        PackageManifest {
            name: "mytool".to_string(),
            version: Version::new(1, 2, 3),
            homepage: "https://example.com".to_string(),
            url: "https://example.com/mytool-1.2.3.tar.gz".to_string(),
            sha256: sha256.to_string(),
            license: "MIT".to_string(),
            depends_on: vec!["jq".to_string()],
            head: Some(HeadRef {
                url: "https://example.com/mytool.git".to_string(),
                branch: "main".to_string(),
            }),
            install: vec!["*".to_string()],
            caveats: None,
            version_match: None,
        }
    }

    fn test_ctx(tmp: &TempDir) -> GlobalContext {
        GlobalContext::with_home(tmp.path().to_path_buf())
    }

    const GOOD_DIGEST: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_resolve_release() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);
        let manifest = manifest_with_digest(GOOD_DIGEST);

        let plan = resolve(&manifest, &ctx, false).unwrap();
        assert_eq!(plan.archive_url, manifest.url);
        assert_eq!(plan.expected_sha256.as_deref(), Some(GOOD_DIGEST));
        assert!(!plan.verify_advisory);
        assert_eq!(plan.version_label, "1.2.3");
        assert!(plan.prefix.ends_with("cellar/mytool/1.2.3"));
        assert!(plan.launcher_path.ends_with("bin/mytool"));
    }

    #[test]
    fn test_resolve_uppercases_digest_to_lowercase() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);
        let manifest = manifest_with_digest(&GOOD_DIGEST.to_ascii_uppercase());

        let plan = resolve(&manifest, &ctx, false).unwrap();
        assert_eq!(plan.expected_sha256.as_deref(), Some(GOOD_DIGEST));
    }

    #[test]
    fn test_resolve_placeholder_digest_fails() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);
        let manifest = manifest_with_digest(PLACEHOLDER_SHA256);

        let err = resolve(&manifest, &ctx, false).unwrap_err();
        assert_eq!(err.kind(), "ManifestIncomplete");
    }

    #[test]
    fn test_resolve_malformed_digest_fails() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);
        let manifest = manifest_with_digest("deadbeef");

        let err = resolve(&manifest, &ctx, false).unwrap_err();
        assert_eq!(err.kind(), "ManifestIncomplete");
    }

    #[test]
    fn test_resolve_head_skips_digest() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);
        // Head resolution must succeed even with a placeholder digest
        let manifest = manifest_with_digest(PLACEHOLDER_SHA256);

        let plan = resolve(&manifest, &ctx, true).unwrap();
        assert!(plan.verify_advisory);
        assert!(plan.expected_sha256.is_none());
        assert_eq!(plan.version_label, "head");
        assert_eq!(
            plan.archive_url,
            "https://example.com/mytool/archive/refs/heads/main.tar.gz"
        );
    }

    #[test]
    fn test_resolve_head_without_head_ref_fails() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);
        let mut manifest = manifest_with_digest(GOOD_DIGEST);
        manifest.head = None;

        let err = resolve(&manifest, &ctx, true).unwrap_err();
        assert_eq!(err.kind(), "ManifestIncomplete");
    }
}
