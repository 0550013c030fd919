use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;

use galdyn::dynamics::circulation::{align_circulations_with_z, classify_orbits, CirculationParams};
use galdyn::dynamics::period::{peak_to_peak_period, PeriodParams};
use galdyn::dynamics::phase_space::{Orbit, OrbitBatch};

const N_TIMES: usize = 10_001;

/// Precessing rosette in a tilted plane, circulating about `axis`.
fn rosette(axis: usize, phase: f64) -> Orbit {
    let times: Vec<f64> = (0..N_TIMES).map(|i| 0.05 * i as f64).collect();
    let place = |v: [f64; 3]| Vector3::new(v[axis % 3], v[(axis + 1) % 3], v[(axis + 2) % 3]);

    let positions = times
        .iter()
        .map(|t| {
            let r = 1.0 + 0.3 * (1.7 * t + phase).cos();
            place([0.1 * (0.3 * t).sin(), r * t.cos(), r * t.sin()])
        })
        .collect();
    let velocities = times
        .iter()
        .map(|t| {
            let r = 1.0 + 0.3 * (1.7 * t + phase).cos();
            let dr = -0.51 * (1.7 * t + phase).sin();
            place([
                0.03 * (0.3 * t).cos(),
                dr * t.cos() - r * t.sin(),
                dr * t.sin() + r * t.cos(),
            ])
        })
        .collect();

    Orbit::new(times, positions, velocities).unwrap()
}

fn bench_classify_batch(c: &mut Criterion) {
    let orbits: Vec<Orbit> = (0..32).map(|i| rosette(i % 3, 0.1 * i as f64)).collect();
    let batch = OrbitBatch::from_orbits(&orbits).unwrap();
    let params = CirculationParams::default();

    c.bench_function("classify_orbits/32x10k", |b| {
        b.iter(|| black_box(classify_orbits(black_box(&batch), &params).unwrap()))
    });

    let circulations = classify_orbits(&batch, &params).unwrap();
    c.bench_function("align_circulations_with_z/32x10k", |b| {
        b.iter(|| black_box(align_circulations_with_z(black_box(&batch), &circulations).unwrap()))
    });
}

fn bench_period(c: &mut Criterion) {
    let n = 16_384;
    let t: Vec<f64> = (0..n).map(|i| 10.0 * i as f64 / (n - 1) as f64).collect();
    let f: Vec<f64> = t
        .iter()
        .map(|x| (std::f64::consts::PI * x).sin() + 0.1 * (std::f64::consts::PI * x / 10.0).cos())
        .collect();
    let params = PeriodParams::default();

    c.bench_function("peak_to_peak_period/16k", |b| {
        b.iter(|| black_box(peak_to_peak_period(black_box(&t), black_box(&f), &params).unwrap()))
    });
}

criterion_group!(benches, bench_classify_batch, bench_period);
criterion_main!(benches);
