//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Cask - a manifest-driven installer for prebuilt command-line tools
#[derive(Parser)]
#[command(name = "cask")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, verify, and install a package, and put its launcher on PATH
    Install(InstallArgs),

    /// Remove an installed package and its launcher
    Uninstall(UninstallArgs),

    /// List installed packages
    List(ListArgs),

    /// Show a package manifest
    Info(InfoArgs),

    /// Run the smoke test against an installed package
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InstallArgs {
    /// Package name from the built-in catalog, or a path to a Cask.toml
    pub package: String,

    /// Install from the manifest's development branch instead of the
    /// tagged release (skips digest verification)
    #[arg(long)]
    pub head: bool,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Skip the post-install smoke test
    #[arg(long)]
    pub no_check: bool,
}

#[derive(Args)]
pub struct UninstallArgs {
    /// Package name
    pub package: String,
}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct InfoArgs {
    /// Package name from the built-in catalog, or a path to a Cask.toml
    pub package: String,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Package name from the built-in catalog, or a path to a Cask.toml
    pub package: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
