//! Installation operations: the fetch/verify/unpack/launcher pipeline.

pub mod extract;
pub mod install;
pub mod uninstall;

pub use install::{InstallReport, InstallState, Installer};
pub use uninstall::{uninstall, UninstallOutcome};
