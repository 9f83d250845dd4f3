//! Cask - a manifest-driven installer for prebuilt command-line tools
//!
//! This crate provides the core library functionality for Cask: resolving
//! declarative package manifests into installation plans, fetching and
//! verifying release tarballs, materializing them into isolated prefixes,
//! and generating thin launcher shims on the user's PATH.

pub mod core;
pub mod ops;
pub mod util;

pub use core::{
    errors::InstallError, launcher::Launcher, manifest::PackageManifest, plan::InstallationPlan,
};

pub use ops::install::{InstallReport, Installer};
pub use ops::uninstall::UninstallOutcome;
pub use util::context::GlobalContext;
