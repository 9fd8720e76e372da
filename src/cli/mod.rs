//! Command-line interface for asset-sweep.
//!
//! Every subcommand runs with no arguments against the default layout;
//! options only override individual paths.

use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod analyze;
pub mod cleanup;
pub mod rewrite;

/// asset-sweep - duplicate detection, WebP optimization and reference rewriting for static assets
#[derive(Parser)]
#[command(name = "asset-sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (defaults to ./asset-sweep.toml when present)
    #[arg(long, short, global = true, env = "ASSET_SWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Log format: text or json
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Report duplicates and HEIC files without changing anything
    Analyze(analyze::AnalyzeArgs),
    /// Move duplicates aside and convert images to WebP
    Cleanup(cleanup::CleanupArgs),
    /// Point source references at the optimized images
    Rewrite(rewrite::RewriteArgs),
}
