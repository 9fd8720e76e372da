//! Cleanup report: the JSON record carried from run to run.
//!
//! Only the accumulating lists (`optimized`, `duplicates_found`,
//! `heic_converted`) survive into the next run. Counters, errors and the
//! timestamp always describe the latest run.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Report format version written by this build
pub const REPORT_VERSION: u32 = 1;

/// One transcoded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizedEntry {
    pub original: String,
    pub optimized: String,
    pub original_size: u64,
    pub new_size: u64,
    /// Negative when the re-encode came out larger
    pub saved: i64,
}

impl OptimizedEntry {
    pub fn new(original: &Path, optimized: &Path, original_size: u64, new_size: u64) -> Self {
        Self {
            original: original.to_string_lossy().into_owned(),
            optimized: optimized.to_string_lossy().into_owned(),
            original_size,
            new_size,
            saved: original_size as i64 - new_size as i64,
        }
    }
}

/// One file moved aside as a duplicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub duplicate: String,
    pub original: String,
    pub size: u64,
}

/// Accumulated cleanup results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Missing in reports written before versioning
    #[serde(default)]
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub total_processed: usize,
    pub optimized: Vec<OptimizedEntry>,
    pub duplicates_found: Vec<DuplicateEntry>,
    /// Kept verbatim; nothing in this tool produces these entries
    pub heic_converted: Vec<Value>,
    pub errors: Vec<String>,
}

impl Default for CleanupReport {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanupReport {
    /// Empty report stamped now
    pub fn new() -> Self {
        Self {
            version: REPORT_VERSION,
            timestamp: Utc::now(),
            total_processed: 0,
            optimized: Vec::new(),
            duplicates_found: Vec::new(),
            heic_converted: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Fresh report seeded with a previous run's lists
    pub fn with_history(history: ReportHistory) -> Self {
        Self {
            optimized: history.optimized,
            duplicates_found: history.duplicates_found,
            heic_converted: history.heic_converted,
            ..Self::new()
        }
    }

    pub fn record_optimized(&mut self, entry: OptimizedEntry) {
        self.optimized.push(entry);
    }

    pub fn record_duplicate(&mut self, duplicate: &Path, original: &Path, size: u64) {
        self.duplicates_found.push(DuplicateEntry {
            duplicate: duplicate.to_string_lossy().into_owned(),
            original: original.to_string_lossy().into_owned(),
            size,
        });
    }

    /// Record a per-file failure in the report's error format
    pub fn record_error(&mut self, path: &Path, error: &dyn fmt::Display) {
        self.errors
            .push(format!("Error processing {}: {}", path.display(), error));
    }

    /// Totals for the end-of-run summary
    pub fn summary(&self) -> ReportSummary {
        let optimized_saved: i64 = self.optimized.iter().map(|e| e.saved).sum();
        let heic_saved: i64 = self
            .heic_converted
            .iter()
            .filter_map(|e| e.get("saved").and_then(Value::as_i64))
            .sum();

        ReportSummary {
            total_processed: self.total_processed,
            duplicates_found: self.duplicates_found.len(),
            heic_converted: self.heic_converted.len(),
            bytes_saved: optimized_saved + heic_saved,
            errors: self.errors.len(),
        }
    }
}

/// Lists imported from a previous report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportHistory {
    pub optimized: Vec<OptimizedEntry>,
    pub duplicates_found: Vec<DuplicateEntry>,
    pub heic_converted: Vec<Value>,
}

impl ReportHistory {
    /// Pull the accumulating lists out of a parsed report.
    ///
    /// Each list is imported on its own; one that does not fit the expected
    /// shape is dropped with a warning and the others are kept.
    pub fn from_value(value: &Value) -> Self {
        Self {
            optimized: import_field(value, "optimized"),
            duplicates_found: import_field(value, "duplicates_found"),
            heic_converted: import_field(value, "heic_converted"),
        }
    }
}

fn import_field<T: DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    let Some(field) = value.get(key) else {
        return Vec::new();
    };
    match serde_json::from_value(field.clone()) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Ignoring unreadable '{}' history: {}", key, e);
            Vec::new()
        }
    }
}

/// End-of-run totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_processed: usize,
    pub duplicates_found: usize,
    pub heic_converted: usize,
    pub bytes_saved: i64,
    pub errors: usize,
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total images processed: {}", self.total_processed)?;
        writeln!(f, "Duplicates found: {}", self.duplicates_found)?;
        writeln!(f, "HEIC files converted: {}", self.heic_converted)?;
        writeln!(f, "Errors: {}", self.errors)?;
        write!(
            f,
            "Total space saved: {:.2} MB",
            self.bytes_saved as f64 / (1024.0 * 1024.0)
        )
    }
}

/// Owns the on-disk location of the cleanup report
#[derive(Debug, Clone)]
pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the history lists from disk, failing on I/O or JSON errors
    pub fn read_history(&self) -> Result<ReportHistory> {
        let content = fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&content)?;
        Ok(ReportHistory::from_value(&value))
    }

    /// Start a run: a fresh report carrying whatever history can be read.
    ///
    /// A missing report means a first run. An unreadable one is logged and
    /// treated the same way.
    pub fn load(&self) -> CleanupReport {
        if !self.path.exists() {
            debug!("No previous report at {}", self.path.display());
            return CleanupReport::new();
        }

        match self.read_history() {
            Ok(history) => {
                debug!(
                    "Loaded history: {} optimized, {} duplicates",
                    history.optimized.len(),
                    history.duplicates_found.len()
                );
                CleanupReport::with_history(history)
            }
            Err(e) => {
                warn!("Could not load previous report: {}", e);
                CleanupReport::new()
            }
        }
    }

    /// Stamp and persist the report.
    ///
    /// Written to a sibling temp file first and renamed into place, so a
    /// crash leaves either the old or the new report.
    pub fn save(&self, report: &mut CleanupReport) -> Result<()> {
        report.timestamp = Utc::now();
        report.version = REPORT_VERSION;
        write_json_atomic(&self.path, report)?;

        info!("Report saved to {}", self.path.display());
        Ok(())
    }
}

/// Serialize `value` as pretty JSON via a temp sibling and a rename
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path.file_name().ok_or_else(|| Error::Configuration {
        reason: format!("report path {} has no file name", path.display()),
    })?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let json = serde_json::to_string_pretty(value)?;
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
