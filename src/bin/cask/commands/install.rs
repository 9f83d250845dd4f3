//! `cask install` command

use std::time::Duration;

use anyhow::Result;

use crate::cli::InstallArgs;
use cask::ops::install::smoke_test;
use cask::{GlobalContext, Installer};

pub fn execute(args: InstallArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest = super::load_manifest(&args.package)?;

    let mut installer = Installer::new(&ctx, Duration::from_secs(args.timeout));
    let report = match installer.install(&manifest, args.head) {
        Ok(report) => report,
        Err(e) => {
            if e.is_retryable() {
                eprintln!("note: fetch failures leave nothing behind; re-running the install is safe");
            }
            return Err(e.into());
        }
    };

    eprintln!(
        "   Installed {} {} ({} files)",
        report.package,
        report.version_label,
        report.installed_files.len()
    );
    eprintln!("    Launcher {}", report.launcher_path.display());

    for warning in &report.warnings {
        eprintln!("     Warning {}", warning);
    }

    if !args.no_check {
        if let Err(e) = smoke_test(&report.launcher_path, manifest.version_match()) {
            eprintln!("     Warning {:#}", e);
        }
    }

    if let Some(caveats) = &manifest.caveats {
        eprintln!();
        eprintln!("{}", caveats);
    }

    if !ctx_bin_on_path(&ctx) {
        eprintln!();
        eprintln!(
            "note: add {} to your PATH to use the launcher",
            ctx.bin_dir().display()
        );
    }

    Ok(())
}

/// Whether the launcher directory is already on PATH.
fn ctx_bin_on_path(ctx: &GlobalContext) -> bool {
    let bin = ctx.bin_dir();
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|p| p == bin))
        .unwrap_or(false)
}
