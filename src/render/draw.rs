//! Bounding-box outlines on RGBA buffers.

use crate::detection::Detection;
use crate::render::overlay::{check_rgba, CHANNELS};
use crate::util::{HotspotError, HotspotResult};

/// Outline colors, cycled by detection index.
pub const BOX_PALETTE: [[u8; 3]; 5] = [
    [0x00, 0xFF, 0x00],
    [0xFF, 0x6B, 0x6B],
    [0x4E, 0xCD, 0xC4],
    [0xFF, 0xD9, 0x3D],
    [0x6B, 0xCF, 0x7F],
];

/// Returns the outline color for the detection at `index`.
pub fn palette_color(index: usize) -> [u8; 3] {
    BOX_PALETTE[index % BOX_PALETTE.len()]
}

/// Draws an opaque outline around every detection.
///
/// The stroke of `thickness` pixels is centred on the box edges and clipped to
/// the image.
pub fn draw_box_outlines(
    base: &mut [u8],
    width: usize,
    height: usize,
    detections: &[Detection],
    thickness: usize,
) -> HotspotResult<()> {
    check_rgba(base, width, height)?;
    if thickness == 0 {
        return Err(HotspotError::InvalidInput("outline thickness must be positive"));
    }
    let lo = (thickness / 2) as i64;
    let hi = thickness as i64 - lo;

    for (idx, det) in detections.iter().enumerate() {
        let [r, g, b] = palette_color(idx);
        let (x1, y1, x2, y2) = det.bbox().corners();
        let (x1, y1) = (x1.round() as i64, y1.round() as i64);
        let (x2, y2) = (x2.round() as i64, y2.round() as i64);

        // Outer rectangle minus inner rectangle, half-open on both axes.
        // Casts saturate for far off-image corners, so the offsets must too.
        let (ox0, oy0) = (x1.saturating_sub(lo), y1.saturating_sub(lo));
        let (ox1, oy1) = (x2.saturating_add(hi), y2.saturating_add(hi));
        let (ix0, iy0) = (x1.saturating_add(hi), y1.saturating_add(hi));
        let (ix1, iy1) = (x2.saturating_sub(lo), y2.saturating_sub(lo));

        let y_start = oy0.max(0);
        let y_end = oy1.min(height as i64);
        let x_start = ox0.max(0);
        let x_end = ox1.min(width as i64);
        for y in y_start..y_end {
            let row_inside = y >= iy0 && y < iy1;
            for x in x_start..x_end {
                if row_inside && x >= ix0 && x < ix1 {
                    continue;
                }
                let idx = (y as usize * width + x as usize) * CHANNELS;
                base[idx..idx + CHANNELS].copy_from_slice(&[r, g, b, 255]);
            }
        }
    }
    Ok(())
}
