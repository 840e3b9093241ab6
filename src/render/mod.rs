//! Heatmap coloring, compositing and annotation.
//!
//! A normalized [`DensityGrid`] is mapped through the color ramp into an RGBA
//! [`Overlay`], flattened onto a dark background and finally screen-blended
//! over the source image.

pub mod colormap;
pub mod draw;
#[cfg(feature = "image-io")]
pub mod io;
pub mod overlay;

pub use colormap::{ramp_color, ramp_opacity};
pub use draw::{draw_box_outlines, palette_color, BOX_PALETTE};
pub use overlay::{colorize, composite_over_background, screen_blend, Overlay};

use crate::density::{synthesize_density, DensityGrid};
use crate::detection::Detection;
use crate::pipeline::HotspotConfig;
use crate::trace::{trace_event, trace_span};
use crate::util::{HotspotError, HotspotResult};

/// Presentation parameters for heatmaps and annotations.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Opaque color behind the density layer.
    pub background: [u8; 3],
    /// Strength of the screen blend over the source image.
    pub global_alpha: f32,
    /// Box outline width in pixels.
    pub outline_thickness: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: [15, 25, 55],
            global_alpha: 0.8,
            outline_thickness: 3,
        }
    }
}

impl RenderConfig {
    /// Validates the render parameters.
    pub fn validate(&self) -> HotspotResult<()> {
        if !(0.0..=1.0).contains(&self.global_alpha) {
            return Err(HotspotError::InvalidInput(
                "global_alpha must be within [0, 1]",
            ));
        }
        if self.outline_thickness == 0 {
            return Err(HotspotError::InvalidInput(
                "outline_thickness must be positive",
            ));
        }
        Ok(())
    }
}

/// Renders the opaque heatmap layer for a batch of detections.
///
/// An empty batch produces a background-only layer.
pub fn render_heatmap(
    detections: &[Detection],
    width: usize,
    height: usize,
    cfg: &HotspotConfig,
) -> HotspotResult<Overlay> {
    cfg.render.validate()?;
    let _span = trace_span!("heatmap", detections = detections.len()).entered();
    let grid = if detections.is_empty() {
        DensityGrid::new(width, height)?
    } else {
        synthesize_density(detections, width, height, &cfg.density)?
    };
    let layer = composite_over_background(&colorize(&grid), cfg.render.background);
    trace_event!("heatmap_rendered", width = width, height = height);
    Ok(layer)
}
