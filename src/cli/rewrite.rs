//! Rewrite command implementation.

use crate::config::Config;
use crate::report::ReportStore;
use crate::rewrite::ReferenceRewriter;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the rewrite command
#[derive(Args)]
pub struct RewriteArgs {
    /// Cleanup report to take the path mapping from (overrides the configured path)
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// Run the rewrite command
pub fn run(args: RewriteArgs, config: &Config) -> Result<()> {
    println!("Updating image references...");

    let report_path = args
        .report
        .unwrap_or_else(|| config.paths.report_file.clone());
    let store = ReportStore::new(&report_path);
    let rewriter = ReferenceRewriter::for_config(config).skipping(&report_path);

    let mapping = rewriter.mapping_from_store(&store);
    let summary = rewriter.run(&mapping);

    for path in &summary.files_updated {
        println!("Updated: {}", path.display());
    }
    for (path, error) in &summary.errors {
        println!("Error processing {}: {}", path.display(), error);
    }

    println!(
        "\nUpdated {} of {} files with new image references ({} mappings)",
        summary.files_updated.len(),
        summary.files_scanned,
        summary.mapping_size
    );
    println!("Please verify the updated files to ensure all references are correct.");

    Ok(())
}
