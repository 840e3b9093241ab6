//! Candidate pruning.
//!
//! Greedy IoU-based non-maximum suppression over decoded detections.

pub(crate) mod nms;
