//! End-to-end checks from raw tensors through to composited heatmaps.

use hotspot::{
    decode_candidates, nms, synthesize_density, BBox, DecodeConfig, Detection, Detector,
    DensityConfig, HotspotConfig, Label, RawTensor, RenderOptions,
};

fn channel_major(cands: &[[f32; 5]]) -> (Vec<f32>, Vec<usize>) {
    let n = cands.len();
    let mut data = vec![0.0f32; 5 * n];
    for (i, c) in cands.iter().enumerate() {
        for (ch, value) in c.iter().enumerate() {
            data[ch * n + i] = *value;
        }
    }
    (data, vec![1, 5, n])
}

fn det(x: f32, y: f32, w: f32, h: f32, conf: f32) -> Detection {
    Detection::new(BBox::new(x, y, w, h), conf, Label::new("pothole")).unwrap()
}

#[test]
fn confidence_filter_keeps_only_strong_candidate() {
    let (data, shape) = channel_major(&[[50.0, 50.0, 90.0, 90.0, 0.9], [30.0, 30.0, 20.0, 20.0, 0.1]]);
    let cfg = DecodeConfig {
        model_input_size: 100.0,
        ..DecodeConfig::default()
    };
    let dets = decode_candidates(
        RawTensor::new(&data, &shape),
        100,
        100,
        &cfg,
        &Label::new("pothole"),
    )
    .unwrap();
    assert_eq!(dets.len(), 1);
    assert_eq!(dets[0].confidence(), 0.9);
    assert_eq!(dets[0].bbox(), &BBox::new(5.0, 5.0, 90.0, 90.0));
}

#[test]
fn decoded_confidences_respect_threshold() {
    let cands: Vec<[f32; 5]> = (0..40)
        .map(|i| {
            let conf = i as f32 / 40.0;
            [16.0 * i as f32 + 8.0, 320.0, 12.0, 12.0, conf]
        })
        .collect();
    let (data, shape) = channel_major(&cands);
    let cfg = DecodeConfig::default();
    let dets = decode_candidates(
        RawTensor::new(&data, &shape),
        640,
        640,
        &cfg,
        &Label::new("pothole"),
    )
    .unwrap();
    assert_eq!(dets.len(), 20);
    assert!(dets.iter().all(|d| d.confidence() >= cfg.confidence_threshold));
}

#[test]
fn nms_threshold_controls_overlap_survival() {
    // inter = 75, union = 125 -> IoU 0.6
    let a = det(0.0, 0.0, 10.0, 10.0, 0.9);
    let b = det(2.5, 0.0, 10.0, 10.0, 0.8);
    let strict = nms(vec![b.clone(), a.clone()], 0.4);
    assert_eq!(strict, vec![a.clone()]);
    let loose = nms(vec![b.clone(), a.clone()], 0.7);
    assert_eq!(loose, vec![a, b]);
}

#[test]
fn single_centered_detection_peaks_near_center() {
    let d = det(75.0, 75.0, 50.0, 50.0, 1.0);
    let grid = synthesize_density(&[d], 200, 200, &DensityConfig::default()).unwrap();
    let (max, x, y) = grid.max_with_position();
    assert_eq!(max, 1.0);
    // bandwidth is max(50 * 0.6, 30) = 30, so the kernel radius is 90
    let dx = x as f32 - 100.0;
    let dy = y as f32 - 100.0;
    assert!((dx * dx + dy * dy).sqrt() <= 90.0, "peak at ({x}, {y})");
    assert!(grid.as_slice().iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
}

#[test]
fn empty_batch_flows_through_every_stage() {
    let detector = Detector::new(HotspotConfig::default(), "pothole").unwrap();
    let data: Vec<f32> = Vec::new();
    let shape = [1, 5, 0];
    let dets = detector
        .detect(&RawTensor::new(&data, &shape), 320, 240)
        .unwrap();
    assert!(dets.is_empty());

    let grid = detector.density(&dets, 320, 240).unwrap();
    assert!(grid.as_slice().iter().all(|v| *v == 0.0));

    let layer = detector.heatmap(&dets, 320, 240).unwrap();
    assert!(layer
        .as_bytes()
        .chunks_exact(4)
        .all(|px| px == [15, 25, 55, 255]));

    let base = vec![90u8; 320 * 240 * 4];
    let out = detector
        .render(
            &base,
            320,
            240,
            &dets,
            RenderOptions {
                show_heatmap: true,
                show_boxes: true,
            },
        )
        .unwrap();
    assert_eq!(out, base);
}

#[test]
fn full_pipeline_outputs_are_finite_and_bounded() {
    let (data, shape) = channel_major(&[
        [200.0, 400.0, 80.0, 60.0, 0.92],
        [205.0, 402.0, 78.0, 62.0, 0.75],
        [450.0, 380.0, 40.0, 30.0, 0.66],
        [600.0, 100.0, 20.0, 20.0, 0.55],
        [300.0, 300.0, 10.0, 10.0, 0.2],
    ]);
    let detector = Detector::new(HotspotConfig::default(), "pothole").unwrap();
    let dets = detector
        .detect(&RawTensor::new(&data, &shape), 1280, 720)
        .unwrap();
    assert_eq!(dets.len(), 3);
    assert!(dets
        .windows(2)
        .all(|w| w[0].confidence() >= w[1].confidence()));

    let grid = detector.density(&dets, 1280, 720).unwrap();
    let max = grid.as_slice().iter().copied().fold(0.0f32, f32::max);
    assert!((max - 1.0).abs() < 1e-6);
    assert!(grid.as_slice().iter().all(|v| v.is_finite() && *v >= 0.0));

    let assessments = detector.assess(&dets, 1280, 720);
    assert_eq!(assessments.len(), 3);
    assert!(assessments.iter().all(|a| !a.crowded && a.batch_size == 3));
}

#[test]
fn extreme_detections_render_without_panicking() {
    let detector = Detector::new(HotspotConfig::default(), "pothole").unwrap();
    let dets = vec![
        det(1e19, 10.0, 10.0, 10.0, 0.9),
        det(0.0, 0.0, 1e20, 40.0, 0.8),
    ];
    let grid = detector.density(&dets, 64, 64).unwrap();
    assert!(grid.as_slice().iter().all(|v| v.is_finite()));

    let base = vec![40u8; 64 * 64 * 4];
    let out = detector
        .render(
            &base,
            64,
            64,
            &dets,
            RenderOptions {
                show_heatmap: true,
                show_boxes: true,
            },
        )
        .unwrap();
    assert_eq!(out.len(), base.len());
}
