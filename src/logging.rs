//! Tracing subscriber setup for the command-line binary

use crate::{Error, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging(quiet: bool, format: LogFormat) -> Result<()> {
    let level = if quiet { LevelFilter::WARN } else { LevelFilter::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let installed = match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
    };

    installed.map_err(|e| Error::Configuration {
        reason: format!("failed to install logger: {}", e),
    })
}
