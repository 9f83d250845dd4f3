//! `cask info` command

use anyhow::Result;

use crate::cli::InfoArgs;

pub fn execute(args: InfoArgs) -> Result<()> {
    let manifest = super::load_manifest(&args.package)?;

    println!("{} {}", manifest.name, manifest.version);
    println!("homepage: {}", manifest.homepage);
    println!("url:      {}", manifest.url);
    println!("sha256:   {}", manifest.sha256);
    println!("license:  {}", manifest.license);

    if !manifest.depends_on.is_empty() {
        println!("depends:  {}", manifest.depends_on.join(", "));
    }

    if let Some(head) = &manifest.head {
        println!("head:     {} (branch {})", head.url, head.branch);
    }

    Ok(())
}
