//! Package manifest parsing and schema.
//!
//! A manifest is the declarative identity of one installable package: where
//! its release tarball lives, what digest that tarball must have, and what
//! it needs at run time. Manifests come from two places:
//!
//! - `Cask.toml` files on disk, parsed with serde + toml
//! - the built-in catalog, a set of static declarations compiled into the
//!   binary (see [`PackageManifest::builtin`])
//!
//! A manifest is immutable once loaded; resolution never mutates it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;

/// Sentinel digest value for manifests written before a release is cut.
///
/// A manifest carrying this value cannot be installed from its release URL;
/// only a `--head` install is possible until the real digest is filled in.
pub const PLACEHOLDER_SHA256: &str = "PLACEHOLDER_SHA256_UPDATE_AFTER_RELEASE";

/// A moving development reference: a git repository plus a branch.
///
/// Head installs download the branch tarball instead of a tagged release,
/// so there is no fixed digest to verify against.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadRef {
    /// Git repository URL (e.g., `https://github.com/acme/tool.git`)
    pub url: String,

    /// Branch name
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl HeadRef {
    /// The archive URL for this branch, in GitHub codeload layout.
    pub fn archive_url(&self) -> String {
        let base = self.url.trim_end_matches('/').trim_end_matches(".git");
        format!("{}/archive/refs/heads/{}.tar.gz", base, self.branch)
    }
}

/// The parsed package manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// Package name; also the launcher name on PATH
    pub name: String,

    /// Released version
    pub version: Version,

    /// Project homepage
    pub homepage: String,

    /// Source archive URL for the released version
    pub url: String,

    /// Expected SHA-256 of the archive (64 hex chars), or the placeholder
    pub sha256: String,

    /// SPDX license identifier
    pub license: String,

    /// Runtime dependencies resolved on PATH at install time.
    /// Provisioning them is the job of an external package manager.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Optional development reference for `--head` installs
    #[serde(default)]
    pub head: Option<HeadRef>,

    /// Glob patterns selecting archive entries to place into the prefix.
    /// The default single `*` pattern keeps everything.
    #[serde(default = "default_install_patterns")]
    pub install: Vec<String>,

    /// Post-install guidance printed once after a successful install
    #[serde(default)]
    pub caveats: Option<String>,

    /// Substring expected in `<tool> version` output (smoke test).
    /// Defaults to the package name when absent.
    #[serde(default)]
    pub version_match: Option<String>,
}

fn default_install_patterns() -> Vec<String> {
    vec!["*".to_string()]
}

impl PackageManifest {
    /// Load a manifest from a `Cask.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        let manifest: PackageManifest = toml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;

        validate_package_name(&manifest.name)?;
        Ok(manifest)
    }

    /// Look up a package in the built-in catalog.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "buildcrew" => Some(buildcrew()),
            _ => None,
        }
    }

    /// The substring the smoke test expects in `version` output.
    pub fn version_match(&self) -> &str {
        self.version_match.as_deref().unwrap_or(&self.name)
    }

    /// Whether the release digest is present and usable for verification.
    pub fn has_usable_digest(&self) -> bool {
        self.sha256 != PLACEHOLDER_SHA256 && is_hex_digest(&self.sha256)
    }
}

/// The built-in declaration for BuildCrew.
fn buildcrew() -> PackageManifest {
    PackageManifest {
        name: "buildcrew".to_string(),
        version: Version::new(1, 0, 0),
        homepage: "https://github.com/joshuacarroll/buildcrew".to_string(),
        url: "https://github.com/joshuacarroll/buildcrew/archive/refs/tags/v1.0.0.tar.gz"
            .to_string(),
        sha256: PLACEHOLDER_SHA256.to_string(),
        license: "MIT".to_string(),
        depends_on: vec!["jq".to_string()],
        head: Some(HeadRef {
            url: "https://github.com/joshuacarroll/buildcrew.git".to_string(),
            branch: "main".to_string(),
        }),
        install: default_install_patterns(),
        caveats: Some(
            "BuildCrew has been installed!\n\
             \n\
             To get started:\n\
             \x20 1. Navigate to your project directory\n\
             \x20 2. Run: buildcrew init\n\
             \x20 3. Use /build in Claude Code to create a project plan\n\
             \x20 4. Run: buildcrew run\n\
             \n\
             Documentation: https://github.com/joshuacarroll/buildcrew\n\
             \n\
             Note: Claude Code CLI must be installed separately.\n\
             Visit: https://claude.ai/code"
                .to_string(),
        ),
        version_match: Some("BuildCrew".to_string()),
    }
}

/// Validate a package name: `[a-z][a-z0-9_-]*`.
///
/// The name ends up in filesystem paths, the launcher filename, and the
/// `<PRODUCT>_HOME` variable, so anything outside this set is rejected.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("package name cannot be empty");
    }

    let first_char = name.chars().next().unwrap();
    if !first_char.is_ascii_lowercase() {
        bail!(
            "invalid package name '{}': must start with lowercase letter [a-z]",
            name
        );
    }

    for c in name.chars() {
        if !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-') {
            bail!(
                "invalid package name '{}': only [a-z0-9_-] allowed, found '{}'",
                name,
                c
            );
        }
    }

    Ok(())
}

/// Check that a string is a 64-character hex SHA-256 digest.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}
