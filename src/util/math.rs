//! Numeric helpers shared by the density and rendering stages.

/// Euclidean distance between two points.
pub(crate) fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// Divides `num` by `den`, returning 0 when the denominator is not positive.
pub(crate) fn safe_ratio(num: f32, den: f32) -> f32 {
    if den > 0.0 && den.is_finite() {
        num / den
    } else {
        0.0
    }
}

/// Linear interpolation between `a` and `b` at `t` in [0, 1].
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rounds an even kernel size up to the next odd value.
pub(crate) fn odd_kernel_size(size: usize) -> usize {
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}
