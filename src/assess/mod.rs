//! Rule-based per-detection assessment and crop regions.
//!
//! Categories are fixed thresholds on confidence, relative area, aspect ratio
//! and where the box centre sits in the frame. The frame is assumed to be a
//! forward-facing road view, so the lower middle of the image is the vehicle's
//! path.

use std::fmt;

use crate::detection::Detection;
use crate::util::math::safe_ratio;
use crate::util::{HotspotError, HotspotResult};

/// Default padding around crop regions, in pixels.
pub const DEFAULT_CROP_PADDING: usize = 20;

/// Batches larger than this are reported as crowded.
pub const CROWDED_AFTER: usize = 3;

/// Confidence bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfidenceLevel {
    /// At least 0.85.
    VeryHigh,
    /// At least 0.7.
    High,
    /// At least 0.5.
    Medium,
    /// Below 0.5.
    Low,
}

impl ConfidenceLevel {
    /// Buckets a confidence value.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 0.85 {
            Self::VeryHigh
        } else if confidence >= 0.7 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Stable identifier for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryHigh => "very_high",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Size bucket by share of the image area.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizeClass {
    /// More than 5% of the image.
    Large,
    /// More than 2% of the image.
    Medium,
    /// Everything else.
    Small,
}

impl SizeClass {
    /// Buckets an area percentage.
    pub fn from_area_percent(percent: f32) -> Self {
        if percent > 5.0 {
            Self::Large
        } else if percent > 2.0 {
            Self::Medium
        } else {
            Self::Small
        }
    }

    /// Stable identifier for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Medium => "medium",
            Self::Small => "small",
        }
    }
}

/// Shape bucket by aspect ratio `width / height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Wider than 1.5 : 1.
    Elongated,
    /// Narrower than 0.67 : 1.
    Vertical,
    /// Roughly square.
    Compact,
}

impl Shape {
    /// Buckets an aspect ratio.
    pub fn from_aspect(aspect: f32) -> Self {
        if aspect > 1.5 {
            Self::Elongated
        } else if aspect < 0.67 {
            Self::Vertical
        } else {
            Self::Compact
        }
    }

    /// Stable identifier for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elongated => "elongated",
            Self::Vertical => "vertical",
            Self::Compact => "compact",
        }
    }
}

/// Where the box centre sits in the frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Central band and lower part of the frame.
    Critical,
    /// Central band only.
    Center,
    /// Lower part of the frame only.
    Near,
    /// Neither.
    Peripheral,
}

impl Placement {
    /// Classifies a centre point within a `width x height` frame.
    pub fn from_center(center: (f32, f32), width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height as f32);
        let center_band = center.0 > 0.3 * w && center.0 < 0.7 * w;
        let near = center.1 > 0.6 * h;
        match (center_band, near) {
            (true, true) => Self::Critical,
            (true, false) => Self::Center,
            (false, true) => Self::Near,
            (false, false) => Self::Peripheral,
        }
    }

    /// Stable identifier for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Center => "center",
            Self::Near => "near",
            Self::Peripheral => "peripheral",
        }
    }
}

/// Categorical summary of one detection in the context of its batch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Assessment {
    /// Confidence bucket.
    pub confidence: ConfidenceLevel,
    /// Size bucket.
    pub size: SizeClass,
    /// Shape bucket.
    pub shape: Shape,
    /// Frame placement.
    pub placement: Placement,
    /// Box area as a percentage of the image area.
    pub area_percent: f32,
    /// Number of detections in the batch.
    pub batch_size: usize,
    /// More than [`CROWDED_AFTER`] detections in the batch.
    pub crowded: bool,
}

impl Assessment {
    /// One-line English description.
    pub fn summary(&self) -> String {
        let confidence = match self.confidence {
            ConfidenceLevel::VeryHigh => "very high confidence",
            ConfidenceLevel::High => "high confidence",
            ConfidenceLevel::Medium => "medium confidence, verify visually",
            ConfidenceLevel::Low => "low confidence",
        };
        let size = match self.size {
            SizeClass::Large => "large",
            SizeClass::Medium => "medium-sized",
            SizeClass::Small => "small",
        };
        let shape = match self.shape {
            Shape::Elongated => "elongated",
            Shape::Vertical => "vertically stretched",
            Shape::Compact => "compact",
        };
        let mut out = format!(
            "{size} {shape} region ({:.1}% of frame), {confidence}",
            self.area_percent
        );
        match self.placement {
            Placement::Critical => out.push_str("; in the vehicle path"),
            Placement::Center => out.push_str("; in the central lane area"),
            Placement::Near => out.push_str("; close to the camera"),
            Placement::Peripheral => {}
        }
        if self.crowded {
            out.push_str("; one of many detections");
        } else if self.batch_size > 1 {
            out.push_str("; one of several detections");
        }
        out
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Assesses one detection of a batch within a `width x height` image.
pub fn assess(det: &Detection, batch: &[Detection], width: usize, height: usize) -> Assessment {
    let image_area = width as f32 * height as f32;
    let area_percent = safe_ratio(det.area(), image_area) * 100.0;
    let aspect = safe_ratio(det.width(), det.height());
    Assessment {
        confidence: ConfidenceLevel::from_confidence(det.confidence()),
        size: SizeClass::from_area_percent(area_percent),
        shape: Shape::from_aspect(aspect),
        placement: Placement::from_center(det.center(), width, height),
        area_percent,
        batch_size: batch.len(),
        crowded: batch.len() > CROWDED_AFTER,
    }
}

/// Integer pixel rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

/// Padded crop rectangle around a detection, clipped to the image.
pub fn crop_region(
    det: &Detection,
    width: usize,
    height: usize,
    padding: usize,
) -> HotspotResult<CropRect> {
    if width == 0 || height == 0 {
        return Err(HotspotError::InvalidDimensions { width, height });
    }
    let pad = padding as f32;
    let x0 = (det.x() - pad).floor().clamp(0.0, (width - 1) as f32);
    let y0 = (det.y() - pad).floor().clamp(0.0, (height - 1) as f32);
    let cw = (det.width() + 2.0 * pad).ceil().min(width as f32 - x0);
    let ch = (det.height() + 2.0 * pad).ceil().min(height as f32 - y0);
    Ok(CropRect {
        x: x0 as usize,
        y: y0 as usize,
        width: cw.max(1.0) as usize,
        height: ch.max(1.0) as usize,
    })
}

/// Copies the pixels of `rect` out of an RGBA buffer.
pub fn crop_rgba(base: &[u8], width: usize, height: usize, rect: CropRect) -> HotspotResult<Vec<u8>> {
    crate::render::overlay::check_rgba(base, width, height)?;
    if rect.x + rect.width > width || rect.y + rect.height > height {
        return Err(HotspotError::InvalidInput("crop rectangle exceeds the image"));
    }
    let mut out = Vec::with_capacity(rect.width * rect.height * 4);
    for y in rect.y..rect.y + rect.height {
        let start = (y * width + rect.x) * 4;
        out.extend_from_slice(&base[start..start + rect.width * 4]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{
        assess, crop_region, crop_rgba, ConfidenceLevel, CropRect, Placement, Shape, SizeClass,
        DEFAULT_CROP_PADDING,
    };
    use crate::detection::{Detection, Label};
    use crate::geometry::BBox;

    fn det(x: f32, y: f32, w: f32, h: f32, conf: f32) -> Detection {
        Detection::new(BBox::new(x, y, w, h), conf, Label::new("pothole")).unwrap()
    }

    #[test]
    fn confidence_thresholds_are_inclusive() {
        assert_eq!(ConfidenceLevel::from_confidence(0.85), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_confidence(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.49), ConfidenceLevel::Low);
    }

    #[test]
    fn size_and_shape_thresholds_are_exclusive() {
        assert_eq!(SizeClass::from_area_percent(5.0), SizeClass::Medium);
        assert_eq!(SizeClass::from_area_percent(2.0), SizeClass::Small);
        assert_eq!(Shape::from_aspect(1.5), Shape::Compact);
        assert_eq!(Shape::from_aspect(2.0), Shape::Elongated);
        assert_eq!(Shape::from_aspect(0.5), Shape::Vertical);
    }

    #[test]
    fn placement_regions() {
        assert_eq!(Placement::from_center((50.0, 80.0), 100, 100), Placement::Critical);
        assert_eq!(Placement::from_center((50.0, 20.0), 100, 100), Placement::Center);
        assert_eq!(Placement::from_center((10.0, 80.0), 100, 100), Placement::Near);
        assert_eq!(Placement::from_center((10.0, 20.0), 100, 100), Placement::Peripheral);
        // band edges are exclusive
        assert_eq!(Placement::from_center((30.0, 60.0), 100, 100), Placement::Peripheral);
    }

    #[test]
    fn assessment_combines_buckets() {
        let a = det(40.0, 70.0, 30.0, 10.0, 0.9);
        let batch = vec![a.clone(), det(0.0, 0.0, 5.0, 5.0, 0.6)];
        let result = assess(&a, &batch, 100, 100);
        assert_eq!(result.confidence, ConfidenceLevel::VeryHigh);
        assert_eq!(result.size, SizeClass::Medium);
        assert!((result.area_percent - 3.0).abs() < 1e-4);
        assert_eq!(result.shape, Shape::Elongated);
        assert_eq!(result.placement, Placement::Critical);
        assert!(!result.crowded);
        assert!(result.summary().contains("one of several detections"));
    }

    #[test]
    fn crowded_after_three() {
        let batch: Vec<_> = (0..4).map(|i| det(i as f32 * 20.0, 0.0, 10.0, 10.0, 0.8)).collect();
        assert!(assess(&batch[0], &batch, 100, 100).crowded);
        assert!(!assess(&batch[0], &batch[..3], 100, 100).crowded);
    }

    #[test]
    fn crop_pads_and_clips() {
        let inner = det(50.0, 50.0, 20.0, 10.0, 0.9);
        let rect = crop_region(&inner, 200, 200, DEFAULT_CROP_PADDING).unwrap();
        assert_eq!(rect, CropRect { x: 30, y: 30, width: 60, height: 50 });

        let corner = det(5.0, 190.0, 20.0, 10.0, 0.9);
        let rect = crop_region(&corner, 200, 200, DEFAULT_CROP_PADDING).unwrap();
        assert_eq!(rect, CropRect { x: 0, y: 170, width: 60, height: 30 });
    }

    #[test]
    fn crop_rgba_copies_rows() {
        let (w, h) = (4, 3);
        let base: Vec<u8> = (0..(w * h * 4) as u8).collect();
        let rect = CropRect { x: 1, y: 1, width: 2, height: 2 };
        let out = crop_rgba(&base, w, h, rect).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..4], &base[20..24]);
        assert_eq!(&out[8..12], &base[36..40]);
    }
}
