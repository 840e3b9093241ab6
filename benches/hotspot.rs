use hotspot::lowlevel::separable_blur;
use hotspot::{
    decode_candidates, nms, synthesize_density, BBox, DecodeConfig, DensityConfig, DensityGrid,
    Detection, Label, RawTensor,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const CANDIDATES: usize = 8400;

fn make_tensor(candidates: usize) -> Vec<f32> {
    let mut data = vec![0.0f32; 5 * candidates];
    for i in 0..candidates {
        let h = (i * 2654435761) & 0xFFFF;
        data[i] = (h % 640) as f32;
        data[candidates + i] = ((h / 7) % 640) as f32;
        data[2 * candidates + i] = 8.0 + (h % 120) as f32;
        data[3 * candidates + i] = 8.0 + ((h / 3) % 90) as f32;
        data[4 * candidates + i] = (h % 1000) as f32 / 1000.0;
    }
    data
}

fn make_batch(n: usize) -> Vec<Detection> {
    (0..n)
        .map(|i| {
            let x = ((i * 97) % 1200) as f32;
            let y = ((i * 61) % 660) as f32;
            let conf = 0.5 + ((i * 13) % 50) as f32 / 100.0;
            Detection::new(BBox::new(x, y, 40.0 + (i % 30) as f32, 30.0), conf, Label::new("pothole"))
                .unwrap()
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let data = make_tensor(CANDIDATES);
    let shape = [1, 5, CANDIDATES];
    let cfg = DecodeConfig::default();
    let label = Label::new("pothole");
    c.bench_function("decode_8400", |b| {
        b.iter(|| {
            let tensor = RawTensor::new(black_box(&data), &shape);
            decode_candidates(tensor, 1280, 720, &cfg, &label).unwrap()
        })
    });
}

fn bench_nms(c: &mut Criterion) {
    let batch = make_batch(300);
    c.bench_function("nms_300", |b| {
        b.iter(|| nms(black_box(batch.clone()), 0.4))
    });
}

fn bench_density(c: &mut Criterion) {
    let batch = make_batch(12);
    let cfg = DensityConfig::default();
    c.bench_function("density_1280x720", |b| {
        b.iter(|| synthesize_density(black_box(&batch), 1280, 720, &cfg).unwrap())
    });

    let mut grid = DensityGrid::new(1280, 720).unwrap();
    grid.set(640, 360, 1.0);
    c.bench_function("blur_1280x720", |b| {
        b.iter(|| {
            let mut g = grid.clone();
            separable_blur(black_box(&mut g), 9);
            g
        })
    });
}

criterion_group!(benches, bench_decode, bench_nms, bench_density);
criterion_main!(benches);
