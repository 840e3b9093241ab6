//! Bridges between overlays and the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::render::Overlay;
use crate::util::{HotspotError, HotspotResult};
use std::path::Path;

fn io_err(err: image::ImageError) -> HotspotError {
    HotspotError::ImageIo {
        reason: err.to_string(),
    }
}

/// Copies an overlay into an `image::RgbaImage`.
pub fn overlay_to_image(overlay: &Overlay) -> HotspotResult<image::RgbaImage> {
    let width = u32::try_from(overlay.width()).map_err(|_| HotspotError::InvalidDimensions {
        width: overlay.width(),
        height: overlay.height(),
    })?;
    let height = u32::try_from(overlay.height()).map_err(|_| HotspotError::InvalidDimensions {
        width: overlay.width(),
        height: overlay.height(),
    })?;
    image::RgbaImage::from_raw(width, height, overlay.as_bytes().to_vec()).ok_or(
        HotspotError::BufferTooSmall {
            needed: overlay.width() * overlay.height() * 4,
            got: overlay.as_bytes().len(),
        },
    )
}

/// Loads an image from disk as an RGBA overlay.
pub fn load_rgba_image<P: AsRef<Path>>(path: P) -> HotspotResult<Overlay> {
    let img = image::open(path).map_err(io_err)?.to_rgba8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Overlay::from_rgba(img.into_raw(), width, height)
}

/// Writes an RGBA buffer to disk as PNG.
pub fn save_rgba_png<P: AsRef<Path>>(
    path: P,
    rgba: &[u8],
    width: usize,
    height: usize,
) -> HotspotResult<()> {
    let overlay = Overlay::from_rgba(rgba.to_vec(), width, height)?;
    overlay_to_image(&overlay)?
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(io_err)
}
