//! Cleanup command implementation.

use crate::config::Config;
use crate::pipeline::CleanupPipeline;
use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the cleanup command
#[derive(Args)]
pub struct CleanupArgs {}

/// Run the cleanup command
pub fn run(_args: CleanupArgs, config: &Config) -> Result<()> {
    println!("Starting image cleanup and optimization...");

    let report = CleanupPipeline::new(config.clone())
        .run()
        .context("Cleanup aborted")?;

    println!("\nCleanup and optimization complete!");
    println!("{}", report.summary());
    if !report.errors.is_empty() {
        println!("\nFiles with errors:");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
    println!(
        "\nFull report saved to: {}",
        config.paths.report_file.display()
    );

    Ok(())
}
