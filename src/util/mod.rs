//! Shared utilities

pub mod context;
pub mod fetch;
pub mod fs;
pub mod hash;
pub mod lock;
pub mod process;

pub use context::GlobalContext;
pub use lock::PackageLock;
