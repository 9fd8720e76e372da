//! Read-only duplicate and HEIC analysis of the asset tree

use crate::classify::DuplicateClassifier;
use crate::config::Config;
use crate::fingerprint::hash_file;
use crate::report::write_json_atomic;
use crate::scanner::{suffix, ImageScanner, ScanMode};
use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, span, warn, Level};

/// What the analysis found
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_images: usize,
    pub unique_images: usize,
    pub duplicate_groups: usize,
    pub heic_files: Vec<String>,
    /// Fingerprint → paths, canonical first
    pub duplicates: IndexMap<String, Vec<String>>,
    pub image_sizes: IndexMap<String, u64>,
}

impl AnalysisReport {
    /// Bytes reclaimable by keeping only the canonical copy of each group
    pub fn reclaimable_bytes(&self) -> u64 {
        self.duplicates
            .values()
            .flat_map(|paths| paths.iter().skip(1))
            .filter_map(|path| self.image_sizes.get(path))
            .sum()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
    }
}

/// Byte count in binary units, e.g. `1.5 KiB`
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// Scan and fingerprint the asset tree without touching any file
pub fn analyze(config: &Config) -> AnalysisReport {
    let span = span!(Level::INFO, "analyze", root = %config.paths.base_dir.display());
    let _enter = span.enter();

    let scanner = ImageScanner::new(&config.scan, ScanMode::Analysis);
    let images = scanner.scan(&config.paths.base_dir);
    info!("Found {} image files", images.len());

    let mut classifier = DuplicateClassifier::new();
    let mut image_sizes = IndexMap::new();
    for path in &images {
        let fingerprint = match hash_file(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                warn!("Error processing {}: {}", path.display(), e);
                continue;
            }
        };
        classifier.observe(path.clone(), fingerprint);
        match fs::metadata(path) {
            Ok(meta) => {
                image_sizes.insert(path.to_string_lossy().into_owned(), meta.len());
            }
            Err(e) => warn!("Error processing {}: {}", path.display(), e),
        }
    }

    let heic_files: Vec<String> = images
        .iter()
        .filter(|path| {
            suffix(path)
                .map(|s| config.scan.unsupported_extensions.contains(&s))
                .unwrap_or(false)
        })
        .map(|path| path.to_string_lossy().into_owned())
        .collect();

    let duplicates: IndexMap<String, Vec<String>> = classifier
        .duplicate_groups()
        .into_iter()
        .map(|group| {
            let paths = group
                .files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            (group.fingerprint.to_string(), paths)
        })
        .collect();

    let report = AnalysisReport {
        total_images: images.len(),
        unique_images: classifier.unique_count(),
        duplicate_groups: duplicates.len(),
        heic_files,
        duplicates,
        image_sizes,
    };

    info!(
        "Found {} duplicate groups and {} HEIC files",
        report.duplicate_groups,
        report.heic_files.len()
    );
    report
}
