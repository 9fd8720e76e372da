//! Image discovery under the asset root.
//!
//! Exclusions are plain substring matches against the directory path string,
//! not path components: with the default `duplicates` exclude, a directory
//! named `old-duplicates-2023` is skipped too, as is everything below it.

use crate::config::{ScanConfig, ScanOrder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Which exclusion list applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Read-only analysis: skips the duplicates output
    Analysis,
    /// Cleanup: also skips dependency directories
    Cleanup,
}

/// Walks a directory tree collecting image files
#[derive(Debug, Clone)]
pub struct ImageScanner {
    extensions: Vec<String>,
    excludes: Vec<String>,
    order: ScanOrder,
}

impl ImageScanner {
    /// Create a scanner for the given mode
    pub fn new(config: &ScanConfig, mode: ScanMode) -> Self {
        let excludes = match mode {
            ScanMode::Analysis => config.analysis_excludes.clone(),
            ScanMode::Cleanup => config.cleanup_excludes.clone(),
        };

        Self {
            extensions: config
                .image_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            excludes,
            order: config.order,
        }
    }

    /// Whether a file name carries one of the image suffixes
    pub fn is_image(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Whether a directory falls under one of the exclude substrings.
    ///
    /// The whole path string is matched, absolute prefix included, so a
    /// project living in e.g. `/srv/my-duplicates-site` has every directory
    /// excluded.
    pub fn is_excluded_dir(&self, dir: &Path) -> bool {
        let dir = dir.to_string_lossy();
        self.excludes
            .iter()
            .any(|pattern| dir.contains(pattern.as_str()))
    }

    /// Collect every image below `root` in traversal order.
    ///
    /// Unreadable entries are logged and skipped. A missing root yields an
    /// empty list.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        if self.is_excluded_dir(root) {
            warn!(
                "Scan root {} matches an exclude pattern, nothing below it is scanned",
                root.display()
            );
        }

        let mut walker = WalkDir::new(root).follow_links(false);
        if self.order == ScanOrder::Lexicographic {
            walker = walker.sort_by_file_name();
        }

        let mut images = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|entry| !(entry.file_type().is_dir() && self.is_excluded_dir(entry.path())))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping entry due to error: {}", e);
                    continue;
                }
            };

            if is_file_like(&entry) && self.is_image(entry.path()) {
                images.push(entry.into_path());
            }
        }

        debug!("Found {} images under {}", images.len(), root.display());
        images
    }
}

fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// Lowercased suffix including the leading dot, e.g. `.jpg`
pub fn suffix(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
