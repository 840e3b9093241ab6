//! Greedy non-maximum suppression over detection boxes.

use std::cmp::Ordering;

use crate::detection::Detection;
use crate::geometry::iou;
use crate::trace::{trace_event, trace_span};

fn confidence_cmp_desc(a: &Detection, b: &Detection) -> Ordering {
    b.confidence().total_cmp(&a.confidence())
}

/// Returns indices into `candidates` that survive suppression.
///
/// Candidates are visited by descending confidence; equal confidences keep
/// their input order. A candidate is suppressed when its IoU with an already
/// accepted one is strictly greater than `iou_threshold`. The returned
/// indices are in visiting order.
pub fn nms_indices(candidates: &[Detection], iou_threshold: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    // `sort_by` is stable, which fixes the tie-break to first-seen order.
    order.sort_by(|&a, &b| confidence_cmp_desc(&candidates[a], &candidates[b]));

    let mut alive = vec![true; order.len()];
    let mut kept = Vec::new();
    for (pos, &idx) in order.iter().enumerate() {
        if !alive[pos] {
            continue;
        }
        kept.push(idx);
        let accepted = candidates[idx].bbox();
        for (later, &other) in order.iter().enumerate().skip(pos + 1) {
            if alive[later] && iou(accepted, candidates[other].bbox()) > iou_threshold {
                alive[later] = false;
            }
        }
    }
    kept
}

/// Applies non-maximum suppression and returns the surviving detections.
///
/// The output is ordered by descending confidence. Running it again on its
/// own output with the same threshold returns the same list.
pub fn nms(candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    let _span = trace_span!("nms", candidates = candidates.len()).entered();

    let kept = nms_indices(&candidates, iou_threshold);
    let mut slots: Vec<Option<Detection>> = candidates.into_iter().map(Some).collect();
    let out: Vec<Detection> = kept
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect();

    trace_event!("nms_kept", count = out.len(), suppressed = slots.len() - out.len());
    out
}
