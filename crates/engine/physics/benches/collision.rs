//! Benchmark for level collision
//!
//! Benchmarks grid build time for a generated level and per-frame resolution
//! time for a chassis driving across it.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ferryman_physics::{
    build_grid, classify_faces, Chassis, ControllerConfig, Geometry, GridIndex, Vector3,
    VehicleController,
};

/// Bumpy square terrain of `cells * cells` quads, `spacing` units apart
fn create_test_terrain(cells: usize, spacing: f32) -> Geometry {
    let side = cells + 1;
    let mut positions = Vec::with_capacity(side * side * 3);
    for row in 0..side {
        for col in 0..side {
            let x = col as f32 * spacing;
            let z = row as f32 * spacing;
            positions.extend_from_slice(&[x, (x * 0.05).sin() * (z * 0.05).cos() * 4.0, z]);
        }
    }

    let mut indices = Vec::with_capacity(cells * cells * 6);
    for row in 0..cells {
        for col in 0..cells {
            let i = (row * side + col) as u32;
            let below = i + side as u32;
            indices.extend_from_slice(&[i, below, below + 1, i, below + 1, i + 1]);
        }
    }
    Geometry::new(positions, indices)
}

fn create_test_grid() -> GridIndex {
    build_grid(classify_faces(&[create_test_terrain(128, 8.0)]).expect("valid terrain"))
}

fn bench_grid_build(c: &mut Criterion) {
    let terrain = create_test_terrain(128, 8.0);
    c.bench_function("grid_build_128x128", |b| {
        b.iter(|| {
            let faces = classify_faces(black_box(std::slice::from_ref(&terrain)))
                .expect("valid terrain");
            black_box(build_grid(faces))
        })
    });
}

fn bench_controller_tick(c: &mut Criterion) {
    let grid = create_test_grid();
    let mut chassis = Chassis::new(Vector3::new(100.0, 10.0, 100.0));
    chassis.velocity = Vector3::new(20.0, 0.0, 15.0);
    let template = VehicleController::new(chassis, ControllerConfig::default());

    c.bench_function("controller_60_ticks", |b| {
        b.iter(|| {
            let mut controller = template.clone();
            for _ in 0..60 {
                black_box(controller.update(&grid, -5.0, 1.0 / 60.0));
            }
        })
    });
}

criterion_group!(benches, bench_grid_build, bench_controller_tick);
criterion_main!(benches);
