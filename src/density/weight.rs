//! Per-detection importance weights.
//!
//! A weight blends confidence, relative box size, and how crowded the
//! detection's neighbourhood is. Weights are derived from a batch snapshot on
//! every render and never stored on the detections.

use crate::detection::Detection;
use crate::util::math::{distance, safe_ratio};
use crate::util::{HotspotError, HotspotResult};

/// Coefficients and breakpoints of the weighting model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeightModel {
    /// Share of the confidence term.
    pub confidence_share: f32,
    /// Share of the size term.
    pub size_share: f32,
    /// Share of the proximity term.
    pub proximity_share: f32,
    /// Area ratio at which the size term saturates at 1.
    pub size_saturation_ratio: f32,
    /// Lower bound of the size term.
    pub size_floor: f32,
    /// `(max_distance, factor)` steps tried in order; first match wins.
    pub proximity_steps: [(f32, f32); 3],
    /// Factor used when the nearest neighbour is beyond every step.
    pub proximity_far: f32,
    /// Factor used when the batch has no other detection.
    pub proximity_alone: f32,
}

impl Default for WeightModel {
    fn default() -> Self {
        Self {
            confidence_share: 0.4,
            size_share: 0.3,
            proximity_share: 0.3,
            size_saturation_ratio: 0.2,
            size_floor: 0.3,
            proximity_steps: [(100.0, 1.5), (300.0, 1.2), (500.0, 1.0)],
            proximity_far: 0.7,
            proximity_alone: 1.0,
        }
    }
}

impl WeightModel {
    /// Validates the model coefficients.
    pub fn validate(&self) -> HotspotResult<()> {
        let shares = [self.confidence_share, self.size_share, self.proximity_share];
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(HotspotError::InvalidInput(
                "weight shares must be finite and non-negative",
            ));
        }
        if self.size_saturation_ratio.is_nan() || self.size_saturation_ratio <= 0.0 {
            return Err(HotspotError::InvalidInput(
                "size_saturation_ratio must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.size_floor) {
            return Err(HotspotError::InvalidInput("size_floor must be within [0, 1]"));
        }
        Ok(())
    }

    /// Size term: area ratio scaled to the saturation point and clamped.
    pub fn size_weight(&self, det: &Detection, image_width: usize, image_height: usize) -> f32 {
        let image_area = image_width as f32 * image_height as f32;
        let ratio = safe_ratio(det.area(), image_area);
        (ratio / self.size_saturation_ratio).clamp(self.size_floor, 1.0)
    }

    /// Proximity term for the detection at `index` within `batch`.
    ///
    /// Neighbours are identified by position, so a duplicate box elsewhere in
    /// the batch still counts as a (very close) neighbour.
    pub fn proximity_weight(&self, index: usize, batch: &[Detection]) -> f32 {
        let Some(det) = batch.get(index) else {
            return self.proximity_alone;
        };
        let center = det.center();
        let nearest = batch
            .iter()
            .enumerate()
            .filter(|(other_idx, _)| *other_idx != index)
            .map(|(_, other)| distance(center, other.center()))
            .min_by(f32::total_cmp);
        let Some(d_min) = nearest else {
            return self.proximity_alone;
        };
        self.proximity_steps
            .iter()
            .find(|(limit, _)| d_min < *limit)
            .map(|(_, factor)| *factor)
            .unwrap_or(self.proximity_far)
    }

    /// Full weight for the detection at `index` within `batch`.
    pub fn weight(
        &self,
        index: usize,
        batch: &[Detection],
        image_width: usize,
        image_height: usize,
    ) -> f32 {
        let Some(det) = batch.get(index) else {
            return 0.0;
        };
        self.confidence_share * det.confidence()
            + self.size_share * self.size_weight(det, image_width, image_height)
            + self.proximity_share * self.proximity_weight(index, batch)
    }
}

/// Weight of `batch[index]` under the default model.
pub fn detection_weight(
    index: usize,
    batch: &[Detection],
    image_width: usize,
    image_height: usize,
) -> f32 {
    WeightModel::default().weight(index, batch, image_width, image_height)
}

/// Weights for every detection of a batch, in batch order.
pub fn batch_weights(
    model: &WeightModel,
    batch: &[Detection],
    image_width: usize,
    image_height: usize,
) -> Vec<f32> {
    (0..batch.len())
        .map(|idx| model.weight(idx, batch, image_width, image_height))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{batch_weights, detection_weight, WeightModel};
    use crate::detection::{Detection, Label};
    use crate::geometry::BBox;

    fn det_at(cx: f32, cy: f32, size: f32, conf: f32) -> Detection {
        Detection::new(BBox::from_center(cx, cy, size, size), conf, Label::new("x")).unwrap()
    }

    #[test]
    fn single_detection_uses_alone_factor() {
        let batch = [det_at(50.0, 50.0, 10.0, 1.0)];
        let model = WeightModel::default();
        assert_eq!(model.proximity_weight(0, &batch), 1.0);
        // size ratio 100/10000 = 0.01 -> 0.05, floored at 0.3
        let w = detection_weight(0, &batch, 100, 100);
        assert!((w - (0.4 + 0.3 * 0.3 + 0.3 * 1.0)).abs() < 1e-6);
    }

    #[test]
    fn proximity_steps_follow_nearest_neighbour() {
        let model = WeightModel::default();
        let cases = [(50.0, 1.5), (150.0, 1.2), (400.0, 1.0), (800.0, 0.7)];
        for (offset, expected) in cases {
            let batch = [det_at(0.0, 0.0, 10.0, 1.0), det_at(offset, 0.0, 10.0, 1.0)];
            assert_eq!(model.proximity_weight(0, &batch), expected, "offset {offset}");
            assert_eq!(model.proximity_weight(1, &batch), expected, "offset {offset}");
        }
    }

    #[test]
    fn step_boundaries_are_exclusive() {
        let model = WeightModel::default();
        let batch = [det_at(0.0, 0.0, 10.0, 1.0), det_at(100.0, 0.0, 10.0, 1.0)];
        assert_eq!(model.proximity_weight(0, &batch), 1.2);
    }

    #[test]
    fn duplicate_boxes_count_as_neighbours() {
        let model = WeightModel::default();
        let a = det_at(10.0, 10.0, 10.0, 0.8);
        let batch = [a.clone(), a];
        assert_eq!(model.proximity_weight(0, &batch), 1.5);
    }

    #[test]
    fn large_boxes_saturate_size_term() {
        let model = WeightModel::default();
        let big = det_at(50.0, 50.0, 60.0, 1.0);
        assert_eq!(model.size_weight(&big, 100, 100), 1.0);
        let mid = det_at(50.0, 50.0, 40.0, 1.0);
        // 1600 / 10000 = 0.16 -> 0.8
        assert!((model.size_weight(&mid, 100, 100) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn batch_weights_match_individual_calls() {
        let batch = [
            det_at(10.0, 10.0, 20.0, 0.9),
            det_at(60.0, 10.0, 20.0, 0.6),
            det_at(600.0, 400.0, 80.0, 0.7),
        ];
        let model = WeightModel::default();
        let all = batch_weights(&model, &batch, 640, 480);
        for (idx, w) in all.iter().enumerate() {
            assert_eq!(*w, model.weight(idx, &batch, 640, 480));
        }
    }
}
