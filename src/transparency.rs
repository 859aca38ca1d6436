//! Alpha recovery for renders on a pure black background.
//!
//! A pixel composited over black in screen mode keeps its own brightness, so
//! `max(R, G, B)` is used as its opacity. Near-black pixels become fully
//! transparent. Colour channels are left as they are (no unpremultiply).

use crate::error::{Error, Result};
use image::{ImageBuffer, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Pixels whose brightest channel is below this become fully transparent
pub const NEAR_BLACK_THRESHOLD: u8 = 10;

/// Alpha for a single pixel, from its colour channels only
#[inline]
pub fn alpha_for(r: u8, g: u8, b: u8) -> u8 {
    let max = r.max(g).max(b);
    if max < NEAR_BLACK_THRESHOLD { 0 } else { max }
}

/// Rewrite the alpha channel of a flat RGBA buffer in place.
///
/// Trailing bytes that do not form a whole pixel are left untouched.
pub fn extract_alpha_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        px[3] = alpha_for(px[0], px[1], px[2]);
    }
}

/// Produce a new image with recovered alpha; the source is not modified
pub fn extract_alpha(source: &RgbaImage) -> RgbaImage {
    let mut out = source.clone();
    extract_alpha_in_place(&mut out);
    out
}

/// Build an RGBA surface from raw bytes and extract alpha into it
pub fn extract_alpha_raw(width: u32, height: u32, data: Vec<u8>) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::SurfaceUnavailable(format!(
            "empty surface {}x{}",
            width, height
        )));
    }

    let len = data.len();
    let mut surface: RgbaImage = ImageBuffer::from_raw(width, height, data).ok_or_else(|| {
        Error::SurfaceUnavailable(format!(
            "{} bytes do not fit a {}x{} RGBA surface",
            len, width, height
        ))
    })?;
    extract_alpha_in_place(&mut surface);
    Ok(surface)
}

/// Decode an encoded image, recover alpha and re-encode it as PNG
pub fn extract_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    tracing::debug!(
        width = decoded.width(),
        height = decoded.height(),
        "decoded image for transparency extraction"
    );

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let surface = extract_alpha_raw(width, height, rgba.into_raw())?;
    encode_png(&surface)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}
