//! `cask list` command

use anyhow::Result;
use walkdir::WalkDir;

use crate::cli::ListArgs;
use cask::GlobalContext;

pub fn execute(_args: ListArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let cellar = ctx.cellar_dir();

    if !cellar.exists() {
        println!("no packages installed");
        return Ok(());
    }

    // Cellar layout is cellar/<name>/<version>/...
    let mut entries: Vec<(String, String)> = WalkDir::new(&cellar)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| {
            let version = e.file_name().to_string_lossy().into_owned();
            let name = e
                .path()
                .parent()?
                .file_name()?
                .to_string_lossy()
                .into_owned();
            Some((name, version))
        })
        .collect();
    entries.sort();

    if entries.is_empty() {
        println!("no packages installed");
        return Ok(());
    }

    for (name, version) in entries {
        println!("{} {}", name, version);
    }

    Ok(())
}
