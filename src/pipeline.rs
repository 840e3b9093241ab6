//! High-level detection and heatmap pipeline.
//!
//! [`Detector`] bundles a validated [`HotspotConfig`] with the class label used
//! for decoded candidates, and exposes the decode, density, heatmap and final
//! render stages as independent calls.

use crate::assess::{assess, Assessment};
use crate::candidate::nms::nms;
use crate::decode::{decode_candidates, DecodeConfig, RawTensor};
use crate::density::{synthesize_density, DensityConfig, DensityGrid};
use crate::detection::{Detection, Label};
use crate::render::overlay::check_rgba;
use crate::render::{draw_box_outlines, render_heatmap, screen_blend, Overlay, RenderConfig};
use crate::trace::{trace_event, trace_span};
use crate::util::{HotspotError, HotspotResult};

/// Every tunable of the pipeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HotspotConfig {
    /// Tensor decoding parameters.
    pub decode: DecodeConfig,
    /// Candidates overlapping a stronger one by more than this IoU are dropped.
    pub iou_threshold: f32,
    /// Density synthesis parameters.
    pub density: DensityConfig,
    /// Presentation parameters.
    pub render: RenderConfig,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            decode: DecodeConfig::default(),
            iou_threshold: 0.4,
            density: DensityConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl HotspotConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> HotspotResult<()> {
        self.decode.validate()?;
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(HotspotError::InvalidInput(
                "iou_threshold must be within [0, 1]",
            ));
        }
        self.density.validate()?;
        self.render.validate()
    }
}

/// Which layers [`Detector::render`] draws over the base image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Screen-blend the density heatmap.
    pub show_heatmap: bool,
    /// Outline every detection.
    pub show_boxes: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_heatmap: true,
            show_boxes: false,
        }
    }
}

/// Decoder and heatmap renderer for a single detection class.
#[derive(Clone, Debug)]
pub struct Detector {
    config: HotspotConfig,
    label: Label,
}

impl Detector {
    /// Creates a detector after validating the configuration.
    pub fn new(config: HotspotConfig, label: impl Into<Label>) -> HotspotResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            label: label.into(),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HotspotConfig {
        &self.config
    }

    /// Returns the label assigned to decoded detections.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Decodes a raw tensor and suppresses overlapping candidates.
    ///
    /// The result is ordered by descending confidence.
    pub fn detect(
        &self,
        tensor: &RawTensor<'_>,
        width: usize,
        height: usize,
    ) -> HotspotResult<Vec<Detection>> {
        let _span = trace_span!("detect", width = width, height = height).entered();
        let candidates =
            decode_candidates(*tensor, width, height, &self.config.decode, &self.label)?;
        let kept = nms(candidates, self.config.iou_threshold);
        trace_event!("detections", count = kept.len());
        Ok(kept)
    }

    /// Builds the normalized density grid for a batch.
    pub fn density(
        &self,
        detections: &[Detection],
        width: usize,
        height: usize,
    ) -> HotspotResult<DensityGrid> {
        synthesize_density(detections, width, height, &self.config.density)
    }

    /// Renders the opaque heatmap layer for a batch.
    pub fn heatmap(
        &self,
        detections: &[Detection],
        width: usize,
        height: usize,
    ) -> HotspotResult<Overlay> {
        render_heatmap(detections, width, height, &self.config)
    }

    /// Assesses every detection of a batch.
    pub fn assess(&self, detections: &[Detection], width: usize, height: usize) -> Vec<Assessment> {
        detections
            .iter()
            .map(|det| assess(det, detections, width, height))
            .collect()
    }

    /// Composes the requested layers over a copy of an RGBA base image.
    ///
    /// The heatmap is skipped for an empty batch so the base image comes back
    /// unchanged.
    pub fn render(
        &self,
        base: &[u8],
        width: usize,
        height: usize,
        detections: &[Detection],
        options: RenderOptions,
    ) -> HotspotResult<Vec<u8>> {
        check_rgba(base, width, height)?;
        let _span = trace_span!("render", detections = detections.len()).entered();
        let mut out = base.to_vec();
        if options.show_heatmap && !detections.is_empty() {
            let layer = self.heatmap(detections, width, height)?;
            screen_blend(&mut out, &layer, self.config.render.global_alpha)?;
        }
        if options.show_boxes {
            draw_box_outlines(
                &mut out,
                width,
                height,
                detections,
                self.config.render.outline_thickness,
            )?;
        }
        Ok(out)
    }
}
