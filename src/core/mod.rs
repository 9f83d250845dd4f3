//! Core domain types: manifests, plans, launchers, and the error taxonomy.
//!
//! Everything in this module is pure - no network or filesystem access.
//! I/O lives in `ops` and `util`.

pub mod errors;
pub mod launcher;
pub mod manifest;
pub mod plan;

pub use errors::InstallError;
pub use launcher::Launcher;
pub use manifest::PackageManifest;
pub use plan::InstallationPlan;
