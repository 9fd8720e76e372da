//! WebP transcoding with a fit-within bounding box.
//!
//! Sources flagged for RGB conversion lose their alpha channel; everything
//! else keeps it. Images are only ever scaled down.

use crate::config::OptimizeConfig;
use crate::{Error, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Image optimizer converting sources into the target format
#[derive(Debug, Clone)]
pub struct Optimizer {
    settings: OptimizeConfig,
}

impl Optimizer {
    /// Create a new optimizer
    pub fn new(settings: &OptimizeConfig) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// `path` with its extension swapped for the target format's
    pub fn target_path(&self, path: &Path) -> PathBuf {
        path.with_extension(&self.settings.target_extension)
    }

    fn has_target_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.settings.target_extension))
            .unwrap_or(false)
    }

    fn flattens_alpha(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            return false;
        };
        self.settings.rgb_extensions.iter().any(|rgb| rgb.eq_ignore_ascii_case(&ext))
    }

    /// Whether `source` needs no work: it is already in the target format, or
    /// a same-named target sibling exists that is clearly smaller.
    pub fn is_already_optimized(&self, source: &Path) -> bool {
        if self.has_target_extension(source) {
            return true;
        }

        let sibling = self.target_path(source);
        if !sibling.exists() {
            return false;
        }

        match (fs::metadata(source), fs::metadata(&sibling)) {
            (Ok(original), Ok(optimized)) => {
                (optimized.len() as f64) < original.len() as f64 * self.settings.sibling_size_ratio
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Error checking if image is optimized: {}", e);
                false
            }
        }
    }

    /// Whether output for `source` at `destination` is already newer than
    /// the source. Both the mirrored path and its target-format variant count.
    pub fn is_up_to_date(&self, source: &Path, destination: &Path) -> bool {
        let Some(source_time) = modified(source) else {
            return false;
        };

        [destination.to_path_buf(), self.target_path(destination)]
            .iter()
            .filter_map(|candidate| modified(candidate))
            .any(|dest_time| dest_time > source_time)
    }

    /// Optimize `source` into `destination` (extension replaced).
    ///
    /// Returns the written path, or `None` after logging if decoding or
    /// encoding failed.
    pub fn optimize(&self, source: &Path, destination: &Path) -> Option<PathBuf> {
        match self.try_optimize(source, destination) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Error optimizing {}: {}", source.display(), e);
                None
            }
        }
    }

    /// Fallible core of [`Optimizer::optimize`]
    pub fn try_optimize(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        let mut img = image::open(source)?;

        if self.flattens_alpha(source) {
            img = DynamicImage::ImageRgb8(img.to_rgb8());
        }

        let (width, height) = fit_within(
            img.width(),
            img.height(),
            self.settings.max_width,
            self.settings.max_height,
        );
        if (width, height) != (img.width(), img.height()) {
            debug!(
                "Resizing {} from {}x{} to {}x{}",
                source.display(),
                img.width(),
                img.height(),
                width,
                height
            );
            img = img.resize_exact(width, height, FilterType::Lanczos3);
        }

        let output = self.target_path(destination);
        let encoded = self.encode(&img).map_err(|reason| Error::Encode {
            path: source.to_path_buf(),
            reason,
        })?;
        fs::write(&output, encoded)?;

        Ok(output)
    }

    fn encode(&self, img: &DynamicImage) -> std::result::Result<Vec<u8>, String> {
        let quality = f32::from(self.settings.quality);
        let memory = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                .encode_simple(false, quality)
        } else {
            let rgb = img.to_rgb8();
            webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                .encode_simple(false, quality)
        };

        memory.map(|m| m.to_vec()).map_err(|e| format!("{:?}", e))
    }
}

/// Largest size with the same aspect ratio that fits in `max_width` x
/// `max_height`. Sizes already inside the box are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let aspect = f64::from(width) / f64::from(height);
    if f64::from(max_width) / f64::from(max_height) >= aspect {
        let scaled = (f64::from(max_height) * aspect).round() as u32;
        (scaled.clamp(1, max_width), max_height)
    } else {
        let scaled = (f64::from(max_width) / aspect).round() as u32;
        (max_width, scaled.clamp(1, max_height))
    }
}

/// Delete a source that has been replaced by `optimized`, then try to drop
/// its parent directory.
///
/// Parent removal is best-effort: a non-empty or otherwise busy directory
/// stays where it is and nothing is reported. Returns whether the source was
/// deleted.
pub fn remove_replaced_source(source: &Path, optimized: &Path) -> Result<bool> {
    if optimized == source || !optimized.exists() {
        return Ok(false);
    }

    fs::remove_file(source)?;
    if let Some(parent) = source.parent() {
        if let Err(e) = fs::remove_dir(parent) {
            debug!("Keeping directory {}: {}", parent.display(), e);
        }
    }
    Ok(true)
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
