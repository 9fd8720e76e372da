//! asset-sweep - batch image maintenance for static web assets
//!
//! Main binary entry point for the command-line interface.

use anyhow::Context;
use asset_sweep::cli::{Cli, Commands};
use asset_sweep::logging::init_logging;
use asset_sweep::Config;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.quiet, cli.log_format)?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze(args) => asset_sweep::cli::analyze::run(args, &config),
        Commands::Cleanup(args) => asset_sweep::cli::cleanup::run(args, &config),
        Commands::Rewrite(args) => asset_sweep::cli::rewrite::run(args, &config),
    }
}
