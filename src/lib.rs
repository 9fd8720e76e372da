//! # asset-sweep
//!
//! Batch image maintenance for a web project's static asset directory.
//!
//! ## Features
//!
//! - **Duplicate detection**: MD5 content fingerprints, first copy in scan order wins
//! - **Optimization**: WebP re-encoding with a 1920x1080 fit-within box
//! - **Run history**: a JSON report accumulated across runs and saved atomically
//! - **Reference rewriting**: literal path substitution in source files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use asset_sweep::{CleanupPipeline, Config};
//!
//! # fn main() -> asset_sweep::Result<()> {
//! let config = Config::load(None)?;
//! let report = CleanupPipeline::new(config).run()?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod optimizer;
pub mod pipeline;
pub mod report;
pub mod rewrite;
pub mod scanner;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::CleanupPipeline;
pub use report::{CleanupReport, ReportStore};
pub use rewrite::{PathMapping, ReferenceRewriter};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
