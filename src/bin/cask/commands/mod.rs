//! CLI command implementations.

pub mod check;
pub mod completions;
pub mod info;
pub mod install;
pub mod list;
pub mod uninstall;

use std::path::Path;

use anyhow::{bail, Result};
use cask::PackageManifest;

/// Resolve a CLI package argument into a manifest.
///
/// An argument naming an existing `.toml` file is loaded from disk;
/// anything else is looked up in the built-in catalog.
pub fn load_manifest(package: &str) -> Result<PackageManifest> {
    let path = Path::new(package);
    if path.extension().is_some_and(|ext| ext == "toml") {
        if !path.exists() {
            bail!("manifest file not found: {}", path.display());
        }
        return PackageManifest::load(path);
    }

    PackageManifest::builtin(package).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown package `{}`; pass a Cask.toml path to install from a manifest file",
            package
        )
    })
}
