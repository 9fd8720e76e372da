//! Duplicate classification by content fingerprint.
//!
//! Groups are kept in first-seen order and the first path of each group is
//! canonical. Traversal order is whatever the scanner produced, so which copy
//! ends up canonical can differ between platforms.

use crate::fingerprint::Fingerprint;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of observing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// First file seen with this fingerprint
    Canonical,
    /// Same content as an earlier file
    Duplicate { original: PathBuf },
}

/// Files sharing one fingerprint, in scan order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintGroup {
    pub fingerprint: Fingerprint,
    pub files: Vec<PathBuf>,
}

impl FingerprintGroup {
    /// The first-encountered file
    pub fn canonical(&self) -> &Path {
        &self.files[0]
    }

    /// Everything after the canonical file
    pub fn duplicates(&self) -> &[PathBuf] {
        &self.files[1..]
    }

    pub fn is_duplicate_set(&self) -> bool {
        self.files.len() > 1
    }
}

/// Incremental fingerprint → paths index
#[derive(Debug, Default)]
pub struct DuplicateClassifier {
    groups: IndexMap<Fingerprint, Vec<PathBuf>>,
}

impl DuplicateClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file and say whether it duplicates an earlier one
    pub fn observe(&mut self, path: PathBuf, fingerprint: Fingerprint) -> Classification {
        let files = self.groups.entry(fingerprint).or_default();
        let classification = match files.first() {
            Some(original) => Classification::Duplicate {
                original: original.clone(),
            },
            None => Classification::Canonical,
        };
        files.push(path);
        classification
    }

    /// Number of distinct fingerprints seen
    pub fn unique_count(&self) -> usize {
        self.groups.len()
    }

    /// All groups, including singletons, in first-seen order
    pub fn groups(&self) -> impl Iterator<Item = FingerprintGroup> + '_ {
        self.groups.iter().map(|(fingerprint, files)| FingerprintGroup {
            fingerprint: fingerprint.clone(),
            files: files.clone(),
        })
    }

    /// Groups with two or more members
    pub fn duplicate_groups(&self) -> Vec<FingerprintGroup> {
        self.groups().filter(FingerprintGroup::is_duplicate_set).collect()
    }
}
