//! # Warp Curve Benchmark
//!
//! Per-frame cost of deriving warp draw parameters: envelope, flare and
//! frame clock for every style combination.
//!
//! Run with: `cargo bench --package nova_fx`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nova_fx::curves;
use nova_fx::{FlareStyle, ModelStyle, WarpTiming};

const STEPS: usize = 1000;
const TOTAL: f32 = 10.0;

#[allow(clippy::cast_precision_loss)]
fn timings() -> Vec<WarpTiming> {
    (0..STEPS)
        .map(|step| WarpTiming {
            elapsed: step as f32 * TOTAL / STEPS as f32,
            total: TOTAL,
            open: 2.35,
            close: 2.35,
        })
        .collect()
}

fn bench_envelopes(c: &mut Criterion) {
    let timings = timings();
    let mut group = c.benchmark_group("warp_envelope");

    for (label, style) in [("classic", ModelStyle::Classic), ("cinematic", ModelStyle::Cinematic)] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut sum = 0.0;
                for timing in &timings {
                    sum += style.intensity(black_box(timing));
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_flares(c: &mut Criterion) {
    let timings = timings();
    let mut group = c.benchmark_group("warp_flare");

    for (label, style, ratio) in [
        ("classic", FlareStyle::Classic, 1.0),
        ("enhanced", FlareStyle::Enhanced, 1.0),
        ("cinematic", FlareStyle::Cinematic, 5.3),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut sum = 0.0;
                for timing in &timings {
                    let intensity = ModelStyle::Classic.intensity(timing);
                    sum += style.flare_radius(black_box(100.0), ratio, intensity, timing);
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_frame_clock(c: &mut Criterion) {
    let timings = timings();

    c.bench_function("cinematic_frame_clock", |b| {
        b.iter(|| {
            let mut last = 0;
            for timing in &timings {
                let clock = ModelStyle::Cinematic.frame_time(timing, [1.0, 1.0, 3.0]);
                last = curves::looping_frame(black_box(clock), 20.0, 60);
            }
            black_box(last)
        });
    });
}

criterion_group!(benches, bench_envelopes, bench_flares, bench_frame_clock);
criterion_main!(benches);
