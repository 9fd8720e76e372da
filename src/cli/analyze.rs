//! Analyze command implementation.

use crate::analysis::{analyze, human_bytes};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the analyze command
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Where to write the analysis JSON (overrides the configured path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the analyze command
pub fn run(args: AnalyzeArgs, config: &Config) -> Result<()> {
    println!("Scanning for images in {}...", config.paths.base_dir.display());

    let report = analyze(config);
    let output = args
        .output
        .unwrap_or_else(|| config.paths.analysis_report_file.clone());
    report
        .save(&output)
        .with_context(|| format!("Failed to write analysis report to {}", output.display()))?;

    println!("Found {} image files", report.total_images);
    println!("Unique images: {}", report.unique_images);
    println!(
        "Found {} duplicate groups and {} HEIC files",
        report.duplicate_groups,
        report.heic_files.len()
    );
    println!("Reclaimable: {}", human_bytes(report.reclaimable_bytes()));
    println!("Analysis complete. Report saved to {}", output.display());

    Ok(())
}
