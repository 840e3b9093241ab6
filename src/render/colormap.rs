//! Density-to-color ramp and opacity curve.
//!
//! The ramp runs blue, cyan/green, yellow, orange, red with band boundaries at
//! 0.15, 0.30, 0.45 and 0.65. The red band is the widest so that hot spots
//! stay visually dominant.

/// Band boundaries of the color ramp.
pub const RAMP_BOUNDS: [f32; 4] = [0.15, 0.30, 0.45, 0.65];

fn clamp_density(d: f32) -> f32 {
    debug_assert!(!d.is_nan(), "density must not be NaN");
    if d.is_nan() {
        0.0
    } else {
        d.clamp(0.0, 1.0)
    }
}

// Channel value `start + span * t`, truncated like a pixel write.
fn channel(start: f32, span: f32, t: f32) -> u8 {
    (start + span * t).floor().clamp(0.0, 255.0) as u8
}

/// Maps a normalized density to an RGB color.
pub fn ramp_color(density: f32) -> [u8; 3] {
    let d = clamp_density(density);
    let [b0, b1, b2, b3] = RAMP_BOUNDS;
    if d < b0 {
        let t = d / b0;
        [0, channel(0.0, 100.0, t), 255]
    } else if d < b1 {
        let t = (d - b0) / (b1 - b0);
        [0, channel(100.0, 155.0, t), channel(255.0, -255.0, t)]
    } else if d < b2 {
        let t = (d - b1) / (b2 - b1);
        [channel(0.0, 255.0, t), 255, 0]
    } else if d < b3 {
        let t = (d - b2) / (b3 - b2);
        [255, channel(255.0, -120.0, t), 0]
    } else {
        let t = (d - b3) / (1.0 - b3);
        [255, channel(135.0, -135.0, t), 0]
    }
}

/// Maps a normalized density to an opacity in `[0, 0.95]`.
///
/// Very low densities fade in linearly so the layer has soft edges.
pub fn ramp_opacity(density: f32) -> f32 {
    let d = clamp_density(density);
    if d < 0.02 {
        d / 0.02 * 0.8
    } else if d < 0.15 {
        0.8
    } else if d < 0.30 {
        0.85
    } else if d < 0.45 {
        0.9
    } else {
        0.95
    }
}
