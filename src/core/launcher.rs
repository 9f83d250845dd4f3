//! Launcher shim generation.
//!
//! The launcher is the only artifact a package leaves on PATH: a tiny shell
//! script that binds `<PRODUCT>_HOME` to the isolation prefix and execs the
//! real binary inside it, forwarding all arguments. It carries no logic of
//! its own, so its exit code is always the wrapped tool's exit code.
//!
//! Rendering is a fixed template with exactly two substitution points (the
//! prefix path and the binary path). Substituted strings are validated
//! first, so a hostile manifest cannot smuggle shell syntax into the shim.

use std::path::Path;

use anyhow::{bail, Result};

use crate::core::manifest::validate_package_name;

/// A rendered (not yet written) launcher script.
#[derive(Debug, Clone)]
pub struct Launcher {
    /// Launcher filename on PATH; equal to the package name
    pub name: String,

    /// Environment variable the shim exports (e.g., `BUILDCREW_HOME`)
    pub home_var: String,

    /// Full script text
    pub contents: String,
}

impl Launcher {
    /// Render the launcher for a package installed at `prefix`.
    ///
    /// The wrapped entry point is `<prefix>/bin/<name>`.
    pub fn render(name: &str, prefix: &Path) -> Result<Self> {
        validate_package_name(name)?;

        let prefix_str = shell_safe_path(prefix)?;
        let home_var = home_var_name(name);
        let contents = format!(
            "#!/bin/sh\nexport {home_var}=\"{prefix}\"\nexec \"{prefix}/bin/{name}\" \"$@\"\n",
            home_var = home_var,
            prefix = prefix_str,
            name = name,
        );

        Ok(Launcher {
            name: name.to_string(),
            home_var,
            contents,
        })
    }
}

/// Derive the home variable name for a package: `buildcrew` -> `BUILDCREW_HOME`.
pub fn home_var_name(name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| match c {
            '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    format!("{}_HOME", upper)
}

/// Validate a prefix path for embedding inside double quotes in the shim.
///
/// The prefix comes from our own directory layout, but it still transits a
/// generated script; characters that are meaningful inside double-quoted
/// shell strings are rejected outright rather than escaped.
fn shell_safe_path(path: &Path) -> Result<String> {
    let s = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("prefix path is not valid UTF-8: {}", path.display()))?;

    for c in s.chars() {
        if matches!(c, '"' | '$' | '`' | '\\' | '\n' | '\r') {
            bail!(
                "prefix path contains a character unsafe for the launcher script: {:?}",
                c
            );
        }
    }

    Ok(s.to_string())
}
