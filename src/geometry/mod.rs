//! Axis-aligned box geometry.
//!
//! Boxes are stored in top-left + size form, in pixels. All functions here are
//! pure; degenerate inputs (zero area, empty union) produce `0.0` rather than
//! NaN so downstream stages never see non-finite values.

/// Axis-aligned bounding box with top-left origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl BBox {
    /// Creates a box from its top-left corner and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a box from corner form `(x1, y1, x2, y2)`.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Creates a box from center form `(cx, cy, w, h)`.
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Returns `(x1, y1, x2, y2)`.
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Returns the box center.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns the area, treating negative extents as empty.
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Clamps all four corners to `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f32, height: f32) -> Self {
        let (x1, y1, x2, y2) = self.corners();
        Self::from_corners(
            x1.clamp(0.0, width),
            y1.clamp(0.0, height),
            x2.clamp(0.0, width),
            y2.clamp(0.0, height),
        )
    }

    /// Scales coordinates independently along each axis.
    pub fn scale(&self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }
}

/// Area of the overlap between two boxes (0 when disjoint).
pub fn intersection_area(a: &BBox, b: &BBox) -> f32 {
    let (ax1, ay1, ax2, ay2) = a.corners();
    let (bx1, by1, bx2, by2) = b.corners();
    let w = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
    let h = (ay2.min(by2) - ay1.max(by1)).max(0.0);
    w * h
}

// Area from the corner form so that `iou(a, a)` is exactly 1.
fn corner_area(b: &BBox) -> f32 {
    let (x1, y1, x2, y2) = b.corners();
    (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
}

/// Intersection over union of two boxes, in `[0, 1]`.
///
/// Returns `0.0` when the union is empty so two zero-area boxes never divide
/// by zero.
pub fn iou(a: &BBox, b: &BBox) -> f32 {
    let inter = intersection_area(a, b);
    if inter <= 0.0 {
        return 0.0;
    }
    let union = corner_area(a) + corner_area(b) - inter;
    if union <= 0.0 || union.is_nan() {
        return 0.0;
    }
    (inter / union).clamp(0.0, 1.0)
}
