//! Density field synthesis.
//!
//! Detections are weighted, spread into a per-pixel grid with elliptical
//! Gaussian kernels, smoothed with a separable blur and finally normalized so
//! the hottest cell is 1. Every call owns a fresh grid.

pub mod blur;
pub mod kde;
#[cfg(feature = "rayon")]
pub mod rayon;
pub mod weight;

use crate::detection::Detection;
use crate::trace::{trace_event, trace_span};
use crate::util::{HotspotError, HotspotResult};

use self::weight::{batch_weights, WeightModel};

/// Owned row-major grid of non-negative density values.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityGrid {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl DensityGrid {
    /// Allocates an all-zero grid.
    pub fn new(width: usize, height: usize) -> HotspotResult<Self> {
        if width == 0 || height == 0 {
            return Err(HotspotError::InvalidDimensions { width, height });
        }
        let len = width
            .checked_mul(height)
            .ok_or(HotspotError::InvalidDimensions { width, height })?;
        Ok(Self {
            data: vec![0.0; len],
            width,
            height,
        })
    }

    /// Returns the grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cells in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the cells mutably in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the grid and returns its cells.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns the value at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Overwrites the value at `(x, y)`; out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Returns the largest value and its `(x, y)` position.
    pub fn max_with_position(&self) -> (f32, usize, usize) {
        let mut best = (0.0f32, 0usize);
        for (idx, value) in self.data.iter().enumerate() {
            if *value > best.0 {
                best = (*value, idx);
            }
        }
        (best.0, best.1 % self.width, best.1 / self.width)
    }

    /// Divides every cell by the maximum and returns the previous maximum.
    ///
    /// A grid whose maximum is not positive is left untouched.
    pub fn normalize_max(&mut self) -> f32 {
        let max = self.data.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 && max.is_finite() {
            // Division keeps the peak at exactly 1.
            for value in self.data.iter_mut() {
                *value /= max;
            }
        }
        max
    }
}

/// Parameters of the density synthesizer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DensityConfig {
    /// Lower bound for the kernel bandwidth on each axis, in pixels.
    pub min_bandwidth: f32,
    /// Size of the 1-D smoothing kernel.
    pub blur_kernel_size: usize,
    /// Detection weighting coefficients.
    pub weights: WeightModel,
    /// Run the blur passes in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            min_bandwidth: 30.0,
            blur_kernel_size: 9,
            weights: WeightModel::default(),
            parallel: false,
        }
    }
}

impl DensityConfig {
    /// Validates the synthesizer parameters.
    pub fn validate(&self) -> HotspotResult<()> {
        if !self.min_bandwidth.is_finite() || self.min_bandwidth <= 0.0 {
            return Err(HotspotError::InvalidInput("min_bandwidth must be positive"));
        }
        if self.blur_kernel_size == 0 {
            return Err(HotspotError::InvalidInput(
                "blur_kernel_size must be at least 1",
            ));
        }
        self.weights.validate()
    }
}

/// Builds a normalized density grid for a batch of detections.
///
/// An empty batch yields an all-zero grid.
pub fn synthesize_density(
    detections: &[Detection],
    width: usize,
    height: usize,
    cfg: &DensityConfig,
) -> HotspotResult<DensityGrid> {
    cfg.validate()?;
    let mut grid = DensityGrid::new(width, height)?;
    let _span = trace_span!("density", detections = detections.len()).entered();

    let weights = batch_weights(&cfg.weights, detections, width, height);
    for (det, weight) in detections.iter().zip(weights) {
        kde::accumulate_kde(&mut grid, det, weight, cfg.min_bandwidth);
    }

    smooth(&mut grid, cfg);
    let max = grid.normalize_max();
    trace_event!("density_normalized", max_density = max);
    Ok(grid)
}

#[cfg(feature = "rayon")]
fn smooth(grid: &mut DensityGrid, cfg: &DensityConfig) {
    if cfg.parallel {
        self::rayon::separable_blur_par(grid, cfg.blur_kernel_size);
    } else {
        blur::separable_blur(grid, cfg.blur_kernel_size);
    }
}

#[cfg(not(feature = "rayon"))]
fn smooth(grid: &mut DensityGrid, cfg: &DensityConfig) {
    blur::separable_blur(grid, cfg.blur_kernel_size);
}

#[cfg(test)]
mod tests {
    use super::{synthesize_density, DensityConfig, DensityGrid};
    use crate::detection::{Detection, Label};
    use crate::geometry::BBox;

    #[test]
    fn grid_rejects_zero_dimensions() {
        assert!(DensityGrid::new(0, 5).is_err());
        assert!(DensityGrid::new(5, 0).is_err());
    }

    #[test]
    fn normalize_leaves_zero_grid_alone() {
        let mut grid = DensityGrid::new(4, 4).unwrap();
        assert_eq!(grid.normalize_max(), 0.0);
        assert!(grid.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn normalize_scales_to_unit_max() {
        let mut grid = DensityGrid::new(3, 1).unwrap();
        grid.set(0, 0, 2.0);
        grid.set(2, 0, 4.0);
        assert_eq!(grid.normalize_max(), 4.0);
        assert_eq!(grid.as_slice(), &[0.5, 0.0, 1.0]);
        assert_eq!(grid.max_with_position(), (1.0, 2, 0));
    }

    #[test]
    fn empty_batch_gives_zero_grid() {
        let grid = synthesize_density(&[], 64, 48, &DensityConfig::default()).unwrap();
        assert_eq!(grid.width(), 64);
        assert!(grid.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn zero_confidence_batch_stays_zero() {
        let det = Detection::new(BBox::new(10.0, 10.0, 20.0, 20.0), 0.0, Label::new("x")).unwrap();
        // confidence 0 removes the kernel entirely even though the weight is positive
        let grid = synthesize_density(&[det], 64, 64, &DensityConfig::default()).unwrap();
        assert!(grid.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn very_wide_detection_gives_finite_normalized_grid() {
        let det = Detection::new(BBox::new(0.0, 0.0, 1e20, 40.0), 0.9, Label::new("x")).unwrap();
        let grid = synthesize_density(&[det], 64, 64, &DensityConfig::default()).unwrap();
        assert!(grid
            .as_slice()
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
        assert_eq!(grid.max_with_position().0, 1.0);
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = DensityConfig {
            blur_kernel_size: 0,
            ..DensityConfig::default()
        };
        assert!(synthesize_density(&[], 8, 8, &cfg).is_err());
    }
}
