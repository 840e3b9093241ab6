//! Validated detection records.
//!
//! A `Detection` is immutable once built: fields are private and exposed via
//! accessors. Construction rejects non-finite or non-positive geometry and
//! clamps confidence into `[0, 1]`.

use std::fmt;
use std::sync::Arc;

use crate::geometry::BBox;
use crate::util::{HotspotError, HotspotResult};

/// Class label attached to detections.
///
/// The vocabulary is supplied at runtime; cloning shares the backing string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(Arc<str>);

impl Label {
    /// Creates a label from any string-like value.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// A single detected object in original image pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    bbox: BBox,
    confidence: f32,
    label: Label,
}

impl Detection {
    /// Validates and builds a detection.
    ///
    /// Width and height must be finite and strictly positive; the top-left
    /// corner and the far corner must be finite. Confidence must be finite and is clamped to
    /// `[0, 1]`.
    pub fn new(bbox: BBox, confidence: f32, label: Label) -> HotspotResult<Self> {
        if !bbox.x.is_finite() || !bbox.y.is_finite() {
            return Err(HotspotError::InvalidBox {
                reason: "non-finite position",
            });
        }
        if !bbox.width.is_finite() || !bbox.height.is_finite() {
            return Err(HotspotError::InvalidBox {
                reason: "non-finite size",
            });
        }
        if !(bbox.x + bbox.width).is_finite() || !(bbox.y + bbox.height).is_finite() {
            return Err(HotspotError::InvalidBox {
                reason: "extent overflows",
            });
        }
        if bbox.width <= 0.0 || bbox.height <= 0.0 {
            return Err(HotspotError::InvalidBox {
                reason: "width and height must be positive",
            });
        }
        if !confidence.is_finite() {
            return Err(HotspotError::InvalidInput("confidence must be finite"));
        }
        Ok(Self {
            bbox,
            confidence: confidence.clamp(0.0, 1.0),
            label,
        })
    }

    /// Returns the bounding box.
    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    /// Returns the confidence in `[0, 1]`.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Returns the class label.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Left edge in pixels.
    pub fn x(&self) -> f32 {
        self.bbox.x
    }

    /// Top edge in pixels.
    pub fn y(&self) -> f32 {
        self.bbox.y
    }

    /// Width in pixels.
    pub fn width(&self) -> f32 {
        self.bbox.width
    }

    /// Height in pixels.
    pub fn height(&self) -> f32 {
        self.bbox.height
    }

    /// Center of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        self.bbox.center()
    }

    /// Area of the bounding box in square pixels.
    pub fn area(&self) -> f32 {
        self.bbox.area()
    }
}
