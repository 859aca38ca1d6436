// Export - writes generated images to disk, recovering alpha when requested

use crate::error::Result;
use crate::transparency;
use crate::types::{BackgroundColor, GeneratedImage};
use std::path::{Path, PathBuf};

/// What ended up on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Alpha-extracted PNG
    Transparent(PathBuf),
    /// Original bytes, the image was not meant to be transparent
    Original(PathBuf),
    /// Original bytes after transparency extraction failed
    Fallback(PathBuf),
}

impl ExportOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ExportOutcome::Transparent(p) | ExportOutcome::Original(p) | ExportOutcome::Fallback(p) => p,
        }
    }
}

/// Images of one batch share a timestamp, the id keeps their names apart
pub fn original_filename(prefix: &str, image: &GeneratedImage) -> String {
    format!("{}-{}-{}.png", prefix, image.created_at, image.id)
}

pub fn transparent_filename(prefix: &str, image: &GeneratedImage) -> String {
    format!("{}-transparent-{}-{}.png", prefix, image.created_at, image.id)
}

/// Write `image` into `dir`.
///
/// Images generated with a transparent background go through alpha
/// extraction first. If that fails the original is written instead and
/// the failure is only logged.
pub fn export_image(image: &GeneratedImage, dir: &Path, prefix: &str) -> Result<ExportOutcome> {
    std::fs::create_dir_all(dir)?;

    if image.config.background != BackgroundColor::Transparent {
        let path = dir.join(original_filename(prefix, image));
        std::fs::write(&path, &image.image.bytes)?;
        return Ok(ExportOutcome::Original(path));
    }

    match transparency::extract_png(&image.image.bytes) {
        Ok(png) => {
            let path = dir.join(transparent_filename(prefix, image));
            std::fs::write(&path, png)?;
            tracing::info!("wrote transparent image {}", path.display());
            Ok(ExportOutcome::Transparent(path))
        }
        Err(e) if e.is_post_processing() => {
            tracing::warn!("failed to process transparency for {}: {}", image.id, e);
            let path = dir.join(original_filename(prefix, image));
            std::fs::write(&path, &image.image.bytes)?;
            Ok(ExportOutcome::Fallback(path))
        }
        Err(e) => Err(e),
    }
}

/// Transparency extraction for a file on disk, copying the input when it
/// cannot be processed
pub fn extract_file(input: &Path, output: &Path) -> Result<ExportOutcome> {
    let bytes = std::fs::read(input)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match transparency::extract_png(&bytes) {
        Ok(png) => {
            std::fs::write(output, png)?;
            Ok(ExportOutcome::Transparent(output.to_path_buf()))
        }
        Err(e) if e.is_post_processing() => {
            tracing::warn!("failed to process transparency for {}: {}", input.display(), e);
            std::fs::write(output, &bytes)?;
            Ok(ExportOutcome::Fallback(output.to_path_buf()))
        }
        Err(e) => Err(e),
    }
}
