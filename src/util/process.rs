//! Subprocess and PATH lookup utilities.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Find an executable on the invoking environment's PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Run a program with one argument and capture stdout.
///
/// Used for the post-install smoke test (`<launcher> version`).
pub fn capture_stdout(program: &Path, arg: &str) -> Result<String> {
    let output = Command::new(program)
        .arg(arg)
        .output()
        .with_context(|| format!("failed to run {}", program.display()))?;

    if !output.status.success() {
        bail!(
            "{} {} exited with {}",
            program.display(),
            arg,
            output.status
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
