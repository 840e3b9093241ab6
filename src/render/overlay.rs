//! RGBA overlay buffers and compositing.

use crate::density::DensityGrid;
use crate::render::colormap::{ramp_color, ramp_opacity};
use crate::util::math::lerp;
use crate::util::{HotspotError, HotspotResult};

/// Number of bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Validates that `len` bytes hold a `width x height` RGBA image.
pub(crate) fn required_rgba_len(width: usize, height: usize) -> HotspotResult<usize> {
    if width == 0 || height == 0 {
        return Err(HotspotError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|px| px.checked_mul(CHANNELS))
        .ok_or(HotspotError::InvalidDimensions { width, height })
}

pub(crate) fn check_rgba(buf: &[u8], width: usize, height: usize) -> HotspotResult<()> {
    let needed = required_rgba_len(width, height)?;
    if buf.len() != needed {
        return Err(HotspotError::BufferTooSmall {
            needed,
            got: buf.len(),
        });
    }
    Ok(())
}

/// Owned RGBA8 image in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Overlay {
    /// Creates a fully transparent overlay.
    pub fn new(width: usize, height: usize) -> HotspotResult<Self> {
        let len = required_rgba_len(width, height)?;
        Ok(Self {
            data: vec![0; len],
            width,
            height,
        })
    }

    /// Wraps an existing RGBA buffer of exactly `width * height * 4` bytes.
    pub fn from_rgba(data: Vec<u8>, width: usize, height: usize) -> HotspotResult<Self> {
        check_rgba(&data, width, height)?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the overlay width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the overlay height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the overlay and returns the raw RGBA bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * CHANNELS;
        let px = self.data.get(idx..idx + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Colors a normalized density grid.
///
/// Alpha is `floor(opacity * 255)` so zero density stays fully transparent.
pub fn colorize(grid: &DensityGrid) -> Overlay {
    let mut data = Vec::with_capacity(grid.as_slice().len() * CHANNELS);
    for &d in grid.as_slice() {
        let [r, g, b] = ramp_color(d);
        let a = (ramp_opacity(d) * 255.0).floor() as u8;
        data.extend_from_slice(&[r, g, b, a]);
    }
    Overlay {
        data,
        width: grid.width(),
        height: grid.height(),
    }
}

/// Source-over composites `layer` onto an opaque background color.
///
/// The result is fully opaque.
pub fn composite_over_background(layer: &Overlay, background: [u8; 3]) -> Overlay {
    let mut data = layer.data.clone();
    for px in data.chunks_exact_mut(CHANNELS) {
        let a = px[3] as f32 / 255.0;
        for (c, bg) in px.iter_mut().take(3).zip(background) {
            *c = to_byte(lerp(bg as f32 / 255.0, *c as f32 / 255.0, a));
        }
        px[3] = 255;
    }
    Overlay {
        data,
        width: layer.width,
        height: layer.height,
    }
}

/// Screen-blends `layer` onto `base` in place.
///
/// Each channel is `1 - (1 - base)(1 - layer)`, mixed back with the base by
/// `global_alpha * layer_alpha`. The base alpha channel is preserved.
pub fn screen_blend(base: &mut [u8], layer: &Overlay, global_alpha: f32) -> HotspotResult<()> {
    check_rgba(base, layer.width, layer.height)?;
    if !(0.0..=1.0).contains(&global_alpha) {
        return Err(HotspotError::InvalidInput(
            "global_alpha must be within [0, 1]",
        ));
    }
    for (dst, src) in base
        .chunks_exact_mut(CHANNELS)
        .zip(layer.data.chunks_exact(CHANNELS))
    {
        let mix = global_alpha * src[3] as f32 / 255.0;
        if mix == 0.0 {
            continue;
        }
        for (b, s) in dst.iter_mut().take(3).zip(src) {
            let bf = *b as f32 / 255.0;
            let sf = *s as f32 / 255.0;
            let screen = 1.0 - (1.0 - bf) * (1.0 - sf);
            *b = to_byte(lerp(bf, screen, mix));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{colorize, composite_over_background, screen_blend, Overlay};
    use crate::density::DensityGrid;

    #[test]
    fn zero_density_is_transparent() {
        let grid = DensityGrid::new(2, 2).unwrap();
        let overlay = colorize(&grid);
        assert_eq!(overlay.pixel(1, 1), Some([0, 0, 255, 0]));
    }

    #[test]
    fn peak_density_is_red_and_mostly_opaque() {
        let mut grid = DensityGrid::new(2, 1).unwrap();
        grid.set(0, 0, 1.0);
        let overlay = colorize(&grid);
        assert_eq!(overlay.pixel(0, 0), Some([255, 0, 0, 242]));
    }

    #[test]
    fn background_shows_through_transparent_pixels() {
        let grid = DensityGrid::new(3, 2).unwrap();
        let layer = composite_over_background(&colorize(&grid), [15, 25, 55]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(layer.pixel(x, y), Some([15, 25, 55, 255]));
            }
        }
    }

    #[test]
    fn screen_blend_lightens() {
        let layer = Overlay::from_rgba(vec![128, 128, 128, 255], 1, 1).unwrap();
        let mut base = vec![100, 0, 255, 255];
        screen_blend(&mut base, &layer, 1.0).unwrap();
        // 1 - (1 - 100/255)(1 - 128/255) = 0.6980 -> 178
        assert_eq!(base, vec![178, 128, 255, 255]);
    }

    #[test]
    fn screen_blend_respects_alpha() {
        let layer = Overlay::from_rgba(vec![255, 255, 255, 0], 1, 1).unwrap();
        let mut base = vec![10, 20, 30, 255];
        screen_blend(&mut base, &layer, 0.8).unwrap();
        assert_eq!(base, vec![10, 20, 30, 255]);
    }

    #[test]
    fn screen_blend_checks_buffer_size() {
        let layer = Overlay::new(2, 2).unwrap();
        let mut base = vec![0u8; 8];
        assert!(screen_blend(&mut base, &layer, 0.8).is_err());
    }
}
