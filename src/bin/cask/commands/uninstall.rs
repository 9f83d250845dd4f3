//! `cask uninstall` command

use anyhow::Result;

use crate::cli::UninstallArgs;
use cask::ops::uninstall::uninstall;
use cask::{GlobalContext, UninstallOutcome};

pub fn execute(args: UninstallArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    match uninstall(&ctx, &args.package)? {
        UninstallOutcome::Removed => {
            eprintln!("     Removed {}", args.package);
        }
        UninstallOutcome::NotInstalled => {
            eprintln!("`{}` is not installed", args.package);
        }
    }

    Ok(())
}
