use bevy::math::Vec2;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use freebody::physics::derived::SnapshotQuantities;
use freebody::physics::energy::{EnergyHistory, EnergySample};
use freebody::physics::forces::ForceInferenceEngine;
use freebody::physics::math::Vector;
use freebody::physics::snapshot::{PhysicsObject, TrajectoryPoint, WorldSnapshot};
use freebody::plugins::playback::demo_snapshots;
use freebody::render::energy_chart::EnergyHistoryRenderer;
use freebody::render::free_body::FreeBodyRenderer;
use freebody::render::projector::ViewTransform;
use freebody::render::scene::{SceneFrame, SceneOptions, SceneRenderer};
use freebody::render::time_series::TimeSeriesSampler;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

const SCENE: Vec2 = Vec2::new(800.0, 600.0);

/// A world of `count` bodies scattered at random, each with a long trail
fn random_world(count: usize, seed: u64) -> WorldSnapshot {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut snapshot = WorldSnapshot::default();

    for i in 0..count {
        let position = Vector::new(rng.random_range(5.0..95.0), rng.random_range(0.0..95.0));
        let velocity = Vector::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
        let trajectory = (0..200)
            .map(|step| {
                let t = step as f64 * 0.016;
                TrajectoryPoint::at(position - velocity * (3.2 - t), t)
            })
            .collect();

        snapshot = snapshot.with_object(
            PhysicsObject::new(format!("body-{i}"), rng.random_range(0.5..20.0), position)
                .with_velocity(velocity)
                .with_acceleration(Vector::new(0.0, -9.8))
                .with_trajectory(trajectory),
        );
    }

    snapshot.with_recomputed_totals()
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_render");
    let renderer = SceneRenderer::default();

    for &count in &[1, 10, 50, 200] {
        let snapshot = random_world(count, 42);
        let quantities = SnapshotQuantities::of(&snapshot);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("bodies", count), &count, |b, _| {
            b.iter(|| {
                let list = renderer.render(
                    Some(SceneFrame::new(black_box(&snapshot), &quantities)),
                    &ViewTransform::default(),
                    SCENE,
                    SceneOptions::default(),
                );
                black_box(list.len());
            });
        });
    }

    group.finish();
}

fn bench_single_object_panels(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_object_panels");
    let snapshot = random_world(1, 7);
    let forces = ForceInferenceEngine::default();
    let free_body = FreeBodyRenderer::default();
    let sampler = TimeSeriesSampler::default();

    group.bench_function("free_body", |b| {
        b.iter(|| black_box(free_body.render(Some(&snapshot), &forces, Vec2::new(400.0, 350.0))));
    });

    group.bench_function("motion_graphs", |b| {
        b.iter(|| black_box(sampler.panels(Some(&snapshot), Vec2::new(400.0, 150.0))));
    });

    group.finish();
}

fn bench_energy_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("energy_history");
    let renderer = EnergyHistoryRenderer::new();
    let frames = demo_snapshots(10.0);

    for &length in &[60, 600, 3_600] {
        let mut history = EnergyHistory::new();
        for (i, snapshot) in frames.iter().cycle().take(length).enumerate() {
            history.record(EnergySample {
                time: i as f64 / 60.0,
                ..EnergySample::from_snapshot(snapshot)
            });
        }

        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::new("samples", length), &length, |b, _| {
            b.iter(|| black_box(renderer.render(history.samples(), Vec2::new(800.0, 220.0))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scene,
    bench_single_object_panels,
    bench_energy_history
);
criterion_main!(benches);
