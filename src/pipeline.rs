//! The cleanup pass: fingerprint, move duplicates aside, optimize the rest.
//!
//! Each file runs to completion before the next one starts, and its
//! failures are recorded in the report without stopping the pass. Moves and
//! deletions already made stay made if a later step fails.

use crate::classify::{Classification, DuplicateClassifier};
use crate::config::Config;
use crate::fingerprint::hash_file;
use crate::optimizer::{remove_replaced_source, Optimizer};
use crate::report::{CleanupReport, OptimizedEntry, ReportStore};
use crate::scanner::{suffix, ImageScanner, ScanMode};
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, span, Level};

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Under the processed directory already
    AlreadyProcessed,
    /// Moved into the duplicates directory
    MovedDuplicate { to: PathBuf },
    /// Target format already, or a smaller target sibling exists
    AlreadyOptimized,
    /// Existing output is newer than the source
    UpToDate,
    /// Written to `to`
    Optimized { to: PathBuf },
    /// Decoding or encoding failed; logged, not recorded as an error
    OptimizeFailed,
}

/// Runs one cleanup pass over the asset tree
#[derive(Debug)]
pub struct CleanupPipeline {
    config: Config,
    scanner: ImageScanner,
    optimizer: Optimizer,
    store: ReportStore,
}

impl CleanupPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            scanner: ImageScanner::new(&config.scan, ScanMode::Cleanup),
            optimizer: Optimizer::new(&config.optimize),
            store: ReportStore::new(&config.paths.report_file),
            config,
        }
    }

    /// Run the pass and persist the report.
    ///
    /// Only directory setup and the final save can fail the run; per-file
    /// problems end up in `report.errors`.
    pub fn run(&self) -> Result<CleanupReport> {
        let span = span!(Level::INFO, "cleanup", root = %self.config.paths.base_dir.display());
        let _enter = span.enter();

        fs::create_dir_all(&self.config.paths.duplicates_dir)?;
        fs::create_dir_all(&self.config.paths.processed_dir)?;

        let mut report = self.store.load();

        let images = self.scanner.scan(&self.config.paths.base_dir);
        info!("Found {} images to process", images.len());

        let mut classifier = DuplicateClassifier::new();
        for path in images.into_iter().filter(|p| !self.is_unsupported(p)) {
            match self.process_file(&path, &mut classifier, &mut report) {
                Ok(outcome) => debug!("{}: {:?}", path.display(), outcome),
                Err(e) => {
                    error!("Error processing {}: {}", path.display(), e);
                    report.record_error(&path, &e);
                }
            }
        }

        self.store.save(&mut report)?;
        Ok(report)
    }

    fn is_unsupported(&self, path: &Path) -> bool {
        suffix(path)
            .map(|s| self.config.scan.unsupported_extensions.contains(&s))
            .unwrap_or(false)
    }

    /// Whether `path` is output of an earlier pass. Compared as strings, so
    /// `public/images-old/` counts as processed too.
    fn is_processed_output(&self, path: &Path) -> bool {
        path.to_string_lossy()
            .starts_with(self.config.paths.processed_dir.to_string_lossy().as_ref())
    }

    /// `path` re-rooted from the asset root onto `root`
    fn mirrored(&self, path: &Path, root: &Path) -> Result<PathBuf> {
        let base = &self.config.paths.base_dir;
        let relative = path.strip_prefix(base).map_err(|_| Error::OutsideRoot {
            path: path.to_path_buf(),
            root: base.clone(),
        })?;
        Ok(root.join(relative))
    }

    /// Handle one image. The fingerprint is registered before any
    /// optimization so later copies are routed to the duplicates directory.
    pub fn process_file(
        &self,
        path: &Path,
        classifier: &mut DuplicateClassifier,
        report: &mut CleanupReport,
    ) -> Result<FileOutcome> {
        if self.is_processed_output(path) {
            return Ok(FileOutcome::AlreadyProcessed);
        }

        let fingerprint = hash_file(path)?;

        if let Classification::Duplicate { original } =
            classifier.observe(path.to_path_buf(), fingerprint)
        {
            let size = fs::metadata(path)?.len();
            report.record_duplicate(path, &original, size);

            let target = self.mirrored(path, &self.config.paths.duplicates_dir)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            move_file(path, &target)?;
            info!("Moved duplicate: {} -> {}", path.display(), target.display());
            return Ok(FileOutcome::MovedDuplicate { to: target });
        }

        if self.optimizer.is_already_optimized(path) {
            info!("Skipping already optimized: {}", path.display());
            return Ok(FileOutcome::AlreadyOptimized);
        }

        let destination = self.mirrored(path, &self.config.paths.processed_dir)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        if self.optimizer.is_up_to_date(path, &destination) {
            info!("Skipping, optimized version exists: {}", destination.display());
            return Ok(FileOutcome::UpToDate);
        }

        info!("Optimizing: {}", path.display());
        let outcome = match self.optimizer.optimize(path, &destination) {
            Some(optimized) => {
                let original_size = fs::metadata(path)?.len();
                let new_size = fs::metadata(&optimized)?.len();
                let entry = OptimizedEntry::new(path, &optimized, original_size, new_size);
                info!("Optimized: {} (saved {} bytes)", path.display(), entry.saved);
                report.record_optimized(entry);

                remove_replaced_source(path, &optimized)?;
                FileOutcome::Optimized { to: optimized }
            }
            None => FileOutcome::OptimizeFailed,
        };

        report.total_processed += 1;
        Ok(outcome)
    }
}

/// Rename, falling back to copy and delete (e.g. across filesystems)
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(e) = fs::rename(from, to) {
        debug!("Rename of {} failed ({}), copying instead", from.display(), e);
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}
