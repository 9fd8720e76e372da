//! Configuration for the asset sweep.
//!
//! Every directory name, threshold and extension set lives here as an explicit
//! value handed to each component. Defaults match the layout of a typical
//! Next.js style project: assets under `public/`, sources under `src/`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "asset-sweep.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub scan: ScanConfig,
    pub optimize: OptimizeConfig,
    pub rewrite: RewriteConfig,
}

/// Directory layout and report locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the static asset tree
    pub base_dir: PathBuf,
    /// Receives moved duplicates, mirroring their path under `base_dir`
    pub duplicates_dir: PathBuf,
    /// Receives optimized output, mirroring the source path under `base_dir`
    pub processed_dir: PathBuf,
    /// Cleanup report shared between runs
    pub report_file: PathBuf,
    /// Output of the read-only analysis
    pub analysis_report_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let base_dir = PathBuf::from("public");
        Self {
            duplicates_dir: base_dir.join("duplicates"),
            processed_dir: base_dir.join("images"),
            base_dir,
            report_file: PathBuf::from("image_cleanup_report.json"),
            analysis_report_file: PathBuf::from("image_analysis_report.json"),
        }
    }
}

/// Order in which directory entries are visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOrder {
    /// Whatever order the filesystem returns
    #[default]
    Filesystem,
    /// Entries sorted by file name within each directory
    Lexicographic,
}

/// What the scanner picks up and what it leaves alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Lowercase suffixes (with leading dot) recognised as images
    pub image_extensions: Vec<String>,
    /// Directory substrings skipped by the analysis scan
    pub analysis_excludes: Vec<String>,
    /// Directory substrings skipped by the cleanup scan
    pub cleanup_excludes: Vec<String>,
    /// Suffixes found by the cleanup scan but never processed
    pub unsupported_extensions: Vec<String>,
    pub order: ScanOrder,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            image_extensions: strings(&[".jpg", ".jpeg", ".png", ".webp", ".heic", ".heif"]),
            analysis_excludes: strings(&["duplicates"]),
            cleanup_excludes: strings(&["duplicates", "node_modules"]),
            unsupported_extensions: strings(&[".heic", ".heif"]),
            order: ScanOrder::Filesystem,
        }
    }
}

/// Transcoding parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Lossy WebP quality, 0-100
    pub quality: u8,
    /// Extension (without dot) of the single output format
    pub target_extension: String,
    /// Source extensions (without dot) flattened to RGB before encoding
    pub rgb_extensions: Vec<String>,
    /// An existing target sibling smaller than `source * ratio` counts as optimized
    pub sibling_size_ratio: f64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 85,
            target_extension: "webp".to_string(),
            rgb_extensions: strings(&["png", "jpg", "jpeg"]),
            sibling_size_ratio: 0.9,
        }
    }
}

/// Reference rewriting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Project root; its top-level files are rewritten (non-recursively)
    pub project_root: PathBuf,
    /// Directories walked recursively
    pub source_dirs: Vec<PathBuf>,
    /// Case-sensitive file name suffixes considered text
    pub extensions: Vec<String>,
    /// Replaced by `/` in report `original` paths
    pub original_prefix: String,
    /// Replaced by `/` in report `optimized` paths
    pub optimized_prefix: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            source_dirs: vec![PathBuf::from("src")],
            extensions: strings(&[".tsx", ".ts", ".js", ".jsx", ".json", ".md", ".mdx"]),
            original_prefix: "public/".to_string(),
            optimized_prefix: "public/images/".to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `asset-sweep.toml` in the
    /// working directory is used when present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse and validate a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the optimizer cannot work with
    pub fn validate(&self) -> Result<()> {
        let opt = &self.optimize;
        if opt.quality > 100 {
            return Err(Error::Configuration {
                reason: format!("quality must be between 0 and 100, got {}", opt.quality),
            });
        }
        if opt.max_width == 0 || opt.max_height == 0 {
            return Err(Error::Configuration {
                reason: "max_width and max_height must be non-zero".to_string(),
            });
        }
        if opt.target_extension.is_empty() || opt.target_extension.starts_with('.') {
            return Err(Error::Configuration {
                reason: format!(
                    "target_extension must be a bare extension like \"webp\", got {:?}",
                    opt.target_extension
                ),
            });
        }
        if !(0.0..=1.0).contains(&opt.sibling_size_ratio) {
            return Err(Error::Configuration {
                reason: format!(
                    "sibling_size_ratio must be within 0.0..=1.0, got {}",
                    opt.sibling_size_ratio
                ),
            });
        }
        Ok(())
    }

    /// Defaults rebased onto another working directory
    pub fn rooted_at(root: &Path) -> Self {
        let mut config = Self::default();
        config.paths.base_dir = root.join(&config.paths.base_dir);
        config.paths.duplicates_dir = root.join(&config.paths.duplicates_dir);
        config.paths.processed_dir = root.join(&config.paths.processed_dir);
        config.paths.report_file = root.join(&config.paths.report_file);
        config.paths.analysis_report_file = root.join(&config.paths.analysis_report_file);
        config.rewrite.project_root = root.to_path_buf();
        config.rewrite.source_dirs = config
            .rewrite
            .source_dirs
            .iter()
            .map(|dir| root.join(dir))
            .collect();
        // Report entries now carry the rooted prefix, so strip that instead
        let root = root.to_string_lossy();
        let root = root.trim_end_matches('/');
        config.rewrite.original_prefix = format!("{}/{}", root, config.rewrite.original_prefix);
        config.rewrite.optimized_prefix = format!("{}/{}", root, config.rewrite.optimized_prefix);
        config
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_layout() {
        let config = Config::default();
        assert_eq!(config.paths.base_dir, PathBuf::from("public"));
        assert_eq!(config.paths.duplicates_dir, PathBuf::from("public/duplicates"));
        assert_eq!(config.paths.processed_dir, PathBuf::from("public/images"));
        assert_eq!(config.optimize.max_width, 1920);
        assert_eq!(config.optimize.max_height, 1080);
        assert_eq!(config.optimize.quality, 85);
        assert_eq!(config.rewrite.optimized_prefix, "public/images/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("asset-sweep.toml");
        fs::write(
            &path,
            "[optimize]\nquality = 70\n\n[scan]\norder = \"lexicographic\"\n",
        )?;

        let config = Config::load(Some(&path))?;
        assert_eq!(config.optimize.quality, 70);
        assert_eq!(config.optimize.max_width, 1920);
        assert_eq!(config.scan.order, ScanOrder::Lexicographic);
        assert_eq!(config.paths, PathsConfig::default());
        Ok(())
    }

    #[test]
    fn test_invalid_quality_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[optimize]\nquality = 101\n")?;

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_rooted_at_prefixes_paths() {
        let config = Config::rooted_at(Path::new("/tmp/site"));
        assert_eq!(config.paths.base_dir, PathBuf::from("/tmp/site/public"));
        assert_eq!(
            config.paths.report_file,
            PathBuf::from("/tmp/site/image_cleanup_report.json")
        );
        assert_eq!(config.rewrite.source_dirs, vec![PathBuf::from("/tmp/site/src")]);
        assert_eq!(config.rewrite.original_prefix, "/tmp/site/public/");
        assert_eq!(config.rewrite.optimized_prefix, "/tmp/site/public/images/");
    }
}
