//! Elliptical Gaussian kernel accumulation.

use std::f32::consts::PI;

use crate::density::DensityGrid;
use crate::detection::Detection;

/// Kernel bandwidth is this fraction of the box extent on each axis.
pub const BANDWIDTH_SCALE: f32 = 0.6;
/// Contribution is limited to this many bandwidths from the centre.
pub const INFLUENCE_SIGMAS: f32 = 3.0;
/// Gain applied on top of `confidence * weight`.
pub const INTENSITY_GAIN: f32 = 2.0;

/// Per-axis bandwidths `(hx, hy)` for a detection.
pub fn bandwidths(det: &Detection, min_bandwidth: f32) -> (f32, f32) {
    (
        (det.width() * BANDWIDTH_SCALE).max(min_bandwidth),
        (det.height() * BANDWIDTH_SCALE).max(min_bandwidth),
    )
}

/// Adds one detection's kernel to the grid.
///
/// Cells are addressed by integer pixel coordinates. Only cells inside the
/// ellipse of radii `3 * hx`, `3 * hy` around the box centre receive
/// `norm * exp(-0.5 * (dx²/hx² + dy²/hy²)) * confidence * weight * 2`, with
/// `norm = 1 / (2π hx hy)`. Overlapping kernels add up.
pub fn accumulate_kde(grid: &mut DensityGrid, det: &Detection, weight: f32, min_bandwidth: f32) {
    let (hx, hy) = bandwidths(det, min_bandwidth);
    if !(hx > 0.0 && hy > 0.0) {
        return;
    }
    let intensity = det.confidence() * weight * INTENSITY_GAIN;
    if intensity == 0.0 || !intensity.is_finite() {
        return;
    }

    let (cx, cy) = det.center();
    // Divided per axis so very wide boxes underflow to 0 instead of overflowing.
    let norm = 1.0 / (2.0 * PI * hx) / hy;
    let rx = hx * INFLUENCE_SIGMAS;
    let ry = hy * INFLUENCE_SIGMAS;

    let width = grid.width();
    let height = grid.height();
    let Some((x0, x1)) = cell_span(cx, rx, width) else {
        return;
    };
    let Some((y0, y1)) = cell_span(cy, ry, height) else {
        return;
    };

    let cells = grid.as_mut_slice();
    for y in y0..=y1 {
        let dy = y as f32 - cy;
        let row = &mut cells[y * width..(y + 1) * width];
        for (x, cell) in row.iter_mut().enumerate().take(x1 + 1).skip(x0) {
            let dx = x as f32 - cx;
            if (dx / rx).powi(2) + (dy / ry).powi(2) > 1.0 {
                continue;
            }
            let exponent = -0.5 * ((dx / hx).powi(2) + (dy / hy).powi(2));
            let value = norm * exponent.exp() * intensity;
            if value.is_finite() {
                *cell += value;
            }
        }
    }
}

// Inclusive cell range covering `[center - radius, center + radius]`, clipped
// to `[0, len - 1]`; `None` when the range misses the grid entirely.
fn cell_span(center: f32, radius: f32, len: usize) -> Option<(usize, usize)> {
    let lo = (center - radius).floor();
    let hi = (center + radius).ceil();
    let last = len.checked_sub(1)? as f32;
    if hi < 0.0 || lo > last {
        return None;
    }
    Some((lo.max(0.0) as usize, hi.min(last) as usize))
}
