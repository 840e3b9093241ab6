//! Low-level building blocks for custom heatmap pipelines.
//!
//! These expose the individual density and compositing stages behind the
//! high-level `Detector` API. Most users should prefer `Detector`.

pub use crate::density::blur::{gaussian_kernel_1d, separable_blur};
pub use crate::density::kde::{accumulate_kde, bandwidths};
#[cfg(feature = "rayon")]
pub use crate::density::rayon::separable_blur_par;
pub use crate::density::weight::batch_weights;
pub use crate::geometry::intersection_area;
pub use crate::render::{
    colorize, composite_over_background, draw_box_outlines, ramp_color, ramp_opacity,
    screen_blend,
};
