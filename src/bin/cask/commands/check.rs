//! `cask check` command

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use cask::ops::install::smoke_test;
use cask::GlobalContext;

pub fn execute(args: CheckArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest = super::load_manifest(&args.package)?;

    let launcher = ctx.bin_dir().join(&manifest.name);
    if !launcher.exists() {
        bail!("`{}` is not installed", manifest.name);
    }

    smoke_test(&launcher, manifest.version_match())?;
    eprintln!(
        "          Ok `{} version` mentions \"{}\"",
        manifest.name,
        manifest.version_match()
    );

    Ok(())
}
