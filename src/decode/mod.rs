//! Decoding of raw single-stage detector output.
//!
//! The detector emits a `[batch, channels, candidates]` tensor stored
//! channel-major: all centre-x values first, then all centre-y values, and so
//! on. Channels 0..4 are `cx, cy, w, h, confidence` in the square model input
//! space; any further channels are ignored.

use crate::detection::{Detection, Label};
use crate::geometry::BBox;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{HotspotError, HotspotResult};

/// Number of leading channels read per candidate.
pub const BOX_CHANNELS: usize = 5;

const CH_CX: usize = 0;
const CH_CY: usize = 1;
const CH_W: usize = 2;
const CH_H: usize = 3;
const CH_CONF: usize = 4;

/// Borrowed view of a raw output tensor.
#[derive(Copy, Clone, Debug)]
pub struct RawTensor<'a> {
    data: &'a [f32],
    shape: &'a [usize],
}

impl<'a> RawTensor<'a> {
    /// Wraps a flat buffer and its shape without validating the layout.
    ///
    /// Layout checks happen in [`RawTensor::layout`] so that a malformed
    /// tensor surfaces as an error from the decode call itself.
    pub fn new(data: &'a [f32], shape: &'a [usize]) -> Self {
        Self { data, shape }
    }

    /// Returns the flat buffer.
    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the declared shape.
    pub fn shape(&self) -> &'a [usize] {
        self.shape
    }

    /// Validates the shape and returns `(channels, candidates)`.
    pub fn layout(&self) -> HotspotResult<(usize, usize)> {
        let rank = self.shape.len();
        if rank != 3 {
            return Err(HotspotError::MalformedTensor {
                reason: "expected shape [batch, channels, candidates]",
                rank,
            });
        }
        let (batch, channels, candidates) = (self.shape[0], self.shape[1], self.shape[2]);
        if batch != 1 {
            return Err(HotspotError::UnsupportedBatch { batch });
        }
        if channels < BOX_CHANNELS {
            return Err(HotspotError::MalformedTensor {
                reason: "fewer than 5 channels (cx, cy, w, h, conf)",
                rank,
            });
        }
        let needed = channels
            .checked_mul(candidates)
            .ok_or(HotspotError::MalformedTensor {
                reason: "shape overflows",
                rank,
            })?;
        if self.data.len() < needed {
            return Err(HotspotError::BufferTooSmall {
                needed,
                got: self.data.len(),
            });
        }
        Ok((channels, candidates))
    }
}

/// Parameters for turning raw candidates into detections.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Candidates with confidence below this value are dropped.
    pub confidence_threshold: f32,
    /// Side length of the square model input, in pixels.
    pub model_input_size: f32,
    /// Boxes narrower or shorter than this after clamping are dropped.
    pub min_box_size: f32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            model_input_size: 640.0,
            min_box_size: 5.0,
        }
    }
}

impl DecodeConfig {
    /// Validates the decode parameters.
    pub fn validate(&self) -> HotspotResult<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(HotspotError::InvalidInput(
                "confidence_threshold must be within [0, 1]",
            ));
        }
        if !self.model_input_size.is_finite() || self.model_input_size <= 0.0 {
            return Err(HotspotError::InvalidInput(
                "model_input_size must be positive",
            ));
        }
        if !self.min_box_size.is_finite() || self.min_box_size < 0.0 {
            return Err(HotspotError::InvalidInput(
                "min_box_size must be non-negative",
            ));
        }
        Ok(())
    }
}

fn channel_plane(data: &[f32], channel: usize, candidates: usize) -> &[f32] {
    &data[channel * candidates..(channel + 1) * candidates]
}

/// Decodes candidate detections from a raw tensor.
///
/// Coordinates are rescaled from the model input square to the original
/// image with independent x/y factors, clamped to the image, and boxes that
/// end up smaller than `min_box_size` on either axis are discarded. The
/// result keeps candidate order; an empty result is not an error.
pub fn decode_candidates(
    tensor: RawTensor<'_>,
    image_width: usize,
    image_height: usize,
    cfg: &DecodeConfig,
    label: &Label,
) -> HotspotResult<Vec<Detection>> {
    let (_channels, candidates) = tensor.layout()?;
    if image_width == 0 || image_height == 0 {
        return Err(HotspotError::InvalidDimensions {
            width: image_width,
            height: image_height,
        });
    }
    cfg.validate()?;

    let _span = trace_span!("decode", candidates = candidates).entered();

    let data = tensor.data();
    let (cxs, cys, ws, hs, confs) = (
        channel_plane(data, CH_CX, candidates),
        channel_plane(data, CH_CY, candidates),
        channel_plane(data, CH_W, candidates),
        channel_plane(data, CH_H, candidates),
        channel_plane(data, CH_CONF, candidates),
    );

    let img_w = image_width as f32;
    let img_h = image_height as f32;
    let scale_x = img_w / cfg.model_input_size;
    let scale_y = img_h / cfg.model_input_size;

    let mut above_threshold = 0usize;
    let mut out = Vec::new();
    for i in 0..candidates {
        let conf = confs[i];
        // NaN fails this comparison and is dropped with the low scores.
        if !(conf >= cfg.confidence_threshold) {
            continue;
        }
        above_threshold += 1;

        let (cx, cy, w, h) = (cxs[i], cys[i], ws[i], hs[i]);
        if !(cx.is_finite() && cy.is_finite() && w.is_finite() && h.is_finite()) {
            continue;
        }

        let bbox = BBox::from_center(cx, cy, w, h)
            .scale(scale_x, scale_y)
            .clamp_to(img_w, img_h);
        if bbox.width < cfg.min_box_size || bbox.height < cfg.min_box_size {
            continue;
        }
        // Zero-sized boxes only pass when min_box_size is 0; they are still
        // not valid detections.
        let Ok(det) = Detection::new(bbox, conf, label.clone()) else {
            continue;
        };
        trace_debug!(
            "candidate",
            index = i,
            confidence = conf,
            width = bbox.width,
            height = bbox.height
        );
        out.push(det);
    }

    trace_event!(
        "decoded",
        above_threshold = above_threshold,
        kept = out.len()
    );
    Ok(out)
}
