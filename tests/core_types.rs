use hotspot::{BBox, DensityGrid, Detection, HotspotError, Label, Overlay, RawTensor};

#[test]
fn detection_validates_geometry() {
    let err = Detection::new(BBox::new(0.0, 0.0, 10.0, -2.0), 0.5, Label::new("x"))
        .err()
        .unwrap();
    assert!(matches!(err, HotspotError::InvalidBox { .. }));
    assert!(Detection::new(BBox::new(0.0, f32::INFINITY, 1.0, 1.0), 0.5, Label::new("x")).is_err());
}

#[test]
fn detection_clamps_confidence() {
    let det = Detection::new(BBox::new(1.0, 2.0, 3.0, 4.0), 3.0, Label::new("x")).unwrap();
    assert_eq!(det.confidence(), 1.0);
    assert_eq!(det.center(), (2.5, 4.0));
    assert_eq!(det.area(), 12.0);
}

#[test]
fn raw_tensor_reports_layout() {
    let data = vec![0.0f32; 6 * 4];
    let shape = [1, 6, 4];
    assert_eq!(RawTensor::new(&data, &shape).layout().unwrap(), (6, 4));

    let shape = [1, 4, 6];
    let err = RawTensor::new(&data, &shape).layout().err().unwrap();
    assert!(matches!(err, HotspotError::MalformedTensor { rank: 3, .. }));
}

#[test]
fn density_grid_bounds() {
    let mut grid = DensityGrid::new(3, 2).unwrap();
    grid.set(2, 1, 0.5);
    assert_eq!(grid.get(2, 1), Some(0.5));
    assert_eq!(grid.get(3, 0), None);
    grid.set(9, 9, 1.0);
    assert_eq!(grid.as_slice().iter().sum::<f32>(), 0.5);
    assert!(DensityGrid::new(usize::MAX, 2).is_err());
}

#[test]
fn overlay_requires_exact_rgba_length() {
    assert!(Overlay::from_rgba(vec![0; 12], 2, 2).is_err());
    let overlay = Overlay::from_rgba(vec![7; 16], 2, 2).unwrap();
    assert_eq!(overlay.pixel(1, 1), Some([7, 7, 7, 7]));
    assert_eq!(overlay.pixel(2, 0), None);
    assert_eq!(
        Overlay::new(0, 4).err().unwrap(),
        HotspotError::InvalidDimensions {
            width: 0,
            height: 4
        }
    );
}
