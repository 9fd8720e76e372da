//! Content fingerprints used as the duplicate-detection key

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read size used when streaming a file through the hasher
pub const READ_CHUNK_SIZE: usize = 4096;

/// 128-bit MD5 digest of a file's bytes, as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Get the digest as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fingerprint an in-memory buffer
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(format!("{:x}", md5::compute(data)))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fingerprint a file without loading it whole
pub fn hash_file<P: AsRef<Path>>(file_path: P) -> Result<Fingerprint> {
    let mut file = File::open(file_path)?;
    let mut context = md5::Context::new();
    let mut buffer = [0u8; READ_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(Fingerprint(format!("{:x}", context.compute())))
}
