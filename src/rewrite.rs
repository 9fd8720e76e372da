//! Rewrites asset references in text files after optimization.
//!
//! Matching is a plain substring replace with no notion of string literals,
//! comments or path boundaries. A mapping key that happens to sit inside a
//! longer unrelated path gets replaced as well.

use crate::config::{Config, RewriteConfig};
use crate::report::{OptimizedEntry, ReportStore};
use crate::Result;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Old web path → new web path, in first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapping {
    entries: IndexMap<String, String>,
}

impl PathMapping {
    /// Build web-root paths from report entries.
    ///
    /// Every occurrence of `original_prefix` in an original path and of
    /// `optimized_prefix` in an optimized path becomes `/`. A later entry for
    /// the same original replaces the earlier target but keeps its position.
    pub fn from_entries(entries: &[OptimizedEntry], original_prefix: &str, optimized_prefix: &str) -> Self {
        let mut mapping = IndexMap::new();
        for entry in entries {
            let web_original = entry.original.replace(original_prefix, "/");
            let web_optimized = entry.optimized.replace(optimized_prefix, "/");
            mapping.insert(web_original, web_optimized);
        }
        Self { entries: mapping }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Apply every mapping entry in order. Returns `None` when nothing matched.
    pub fn apply(&self, content: &str) -> Option<String> {
        let mut content = content.to_string();
        let mut updated = false;
        for (original, replacement) in &self.entries {
            if content.contains(original.as_str()) {
                content = content.replace(original.as_str(), replacement);
                updated = true;
            }
        }
        updated.then_some(content)
    }
}

/// Outcome of a rewrite pass
#[derive(Debug, Default)]
pub struct RewriteSummary {
    pub mapping_size: usize,
    pub files_scanned: usize,
    pub files_updated: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, crate::Error)>,
}

/// Rewrites references in source and top-level project files
#[derive(Debug, Clone)]
pub struct ReferenceRewriter {
    config: RewriteConfig,
    skip: Vec<PathBuf>,
}

impl ReferenceRewriter {
    pub fn new(config: &RewriteConfig) -> Self {
        Self {
            config: config.clone(),
            skip: Vec::new(),
        }
    }

    /// Rewriter for a full configuration. Both report files keep the paths
    /// they recorded.
    pub fn for_config(config: &Config) -> Self {
        Self::new(&config.rewrite)
            .skipping(&config.paths.report_file)
            .skipping(&config.paths.analysis_report_file)
    }

    /// Never touch `path`, e.g. the report the mapping came from
    pub fn skipping<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.skip.push(path.as_ref().to_path_buf());
        self
    }

    /// Mapping from the report at `store`.
    ///
    /// A missing or unreadable report yields an empty mapping after a warning
    /// rather than an error.
    pub fn mapping_from_store(&self, store: &ReportStore) -> PathMapping {
        match store.read_history() {
            Ok(history) => PathMapping::from_entries(
                &history.optimized,
                &self.config.original_prefix,
                &self.config.optimized_prefix,
            ),
            Err(e) => {
                warn!(
                    "Could not read report {}: {}; no references will be rewritten",
                    store.path().display(),
                    e
                );
                PathMapping::default()
            }
        }
    }

    fn is_text_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.config
            .extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }

    fn is_skipped(&self, path: &Path) -> bool {
        self.skip.iter().any(|skip| same_file(skip, path))
    }

    /// Files to consider: every matching file under the source directories,
    /// then the matching top-level files of the project root
    pub fn candidate_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for dir in &self.config.source_dirs {
            for entry in WalkDir::new(dir).follow_links(false) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && self.is_text_file(entry.path()) => {
                        files.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => debug!("Skipping entry due to error: {}", e),
                }
            }
        }

        match fs::read_dir(&self.config.project_root) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_file() && self.is_text_file(&path) {
                        files.push(path);
                    }
                }
            }
            Err(e) => warn!(
                "Cannot list project root {}: {}",
                self.config.project_root.display(),
                e
            ),
        }

        files.retain(|path| !self.is_skipped(path));
        files
    }

    /// Rewrite one file. Returns whether it changed.
    pub fn rewrite_file(&self, path: &Path, mapping: &PathMapping) -> Result<bool> {
        let content = fs::read_to_string(path)?;
        match mapping.apply(&content) {
            Some(updated) => {
                fs::write(path, updated)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rewrite every candidate file. Per-file failures are collected, not fatal.
    pub fn run(&self, mapping: &PathMapping) -> RewriteSummary {
        let mut summary = RewriteSummary {
            mapping_size: mapping.len(),
            ..RewriteSummary::default()
        };
        if mapping.is_empty() {
            info!("No optimized paths to rewrite");
            return summary;
        }

        for path in self.candidate_files() {
            summary.files_scanned += 1;
            match self.rewrite_file(&path, mapping) {
                Ok(true) => {
                    info!("Updated: {}", path.display());
                    summary.files_updated.push(path);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Error processing {}: {}", path.display(), e);
                    summary.errors.push((path, e));
                }
            }
        }

        summary
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
