//! Cask CLI - a manifest-driven installer for prebuilt command-line tools

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("cask=debug")
    } else {
        EnvFilter::new("cask=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Install(args) => commands::install::execute(args),
        Commands::Uninstall(args) => commands::uninstall::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
