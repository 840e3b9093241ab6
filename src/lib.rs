//! Hotspot turns raw single-stage detector output into detections and density
//! heatmaps.
//!
//! The crate decodes `[1, channels, candidates]` tensors, prunes overlapping
//! boxes with greedy IoU suppression, weights each detection by confidence,
//! size and crowding, and renders a smoothed kernel density estimate through a
//! color ramp over the source image. Blur passes can run in parallel via the
//! `rayon` feature; `image-io` adds PNG/JPEG helpers and `tracing` adds spans.

pub mod assess;
mod candidate;
pub mod decode;
pub mod density;
pub mod detection;
pub mod geometry;
pub mod lowlevel;
pub mod pipeline;
pub mod render;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use render::io;

pub use assess::{assess, crop_region, Assessment, CropRect};
pub use candidate::nms::{nms, nms_indices};
pub use decode::{decode_candidates, DecodeConfig, RawTensor};
pub use density::weight::{detection_weight, WeightModel};
pub use density::{synthesize_density, DensityConfig, DensityGrid};
pub use detection::{Detection, Label};
pub use geometry::{iou, BBox};
pub use pipeline::{Detector, HotspotConfig, RenderOptions};
pub use render::{render_heatmap, Overlay, RenderConfig};
pub use util::{HotspotError, HotspotResult};
