//! Benchmarks for trajectory generation and virtual-clock playback
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mousecontrol::driver::NoopDriver;
use mousecontrol::scheduler::{Clock, EventScheduler, ManualClock};
use mousecontrol::{EasingKind, MoveStep, Point, TrajectoryGenerator};
use std::sync::Arc;

fn step(duration_ms: u64, easing: EasingKind, jitter: f64) -> MoveStep {
    MoveStep::new(Point::new(10, 10), Point::new(1800, 1000), duration_ms)
        .with_easing(easing)
        .with_jitter(jitter)
        .with_seed(7)
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let generator = TrajectoryGenerator::default();

    for duration in [100u64, 1_000, 10_000].iter() {
        let samples = generator.sample_offsets(*duration).len() as u64;
        group.throughput(Throughput::Elements(samples));

        for (name, easing, jitter) in [
            ("linear", EasingKind::Linear, 0.0),
            ("ease_in_out", EasingKind::EaseInOut, 0.0),
            ("bezier_human", EasingKind::BezierHuman, 0.2),
        ] {
            let request = step(*duration, easing, jitter);
            group.bench_with_input(BenchmarkId::new(name, duration), &request, |b, request| {
                b.iter(|| generator.generate(black_box(request)).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_virtual_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("virtual_playback");
    let trajectory = TrajectoryGenerator::default()
        .generate(&step(10_000, EasingKind::BezierHuman, 0.2))
        .unwrap();
    group.throughput(Throughput::Elements(trajectory.len() as u64));

    group.bench_function("play_10s_noop", |b| {
        b.iter(|| {
            let clock = Arc::new(ManualClock::new());
            let scheduler = EventScheduler::with_clock(clock.clone());
            let mut driver = NoopDriver::new();
            scheduler
                .play(black_box(&trajectory), &mut driver, clock.now())
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_generate, bench_virtual_playback);
criterion_main!(benches);
