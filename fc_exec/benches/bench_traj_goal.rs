//! # Trajectory Goal Benchmark

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;

use fc_lib::traj::{TrajEntry, TrajPoint, Trajectory, MAX_TRAJ_ENTRIES};

fn traj_goal_benchmark(c: &mut Criterion) {
    // ---- Build a full trajectory ----

    // A helix, one waypoint every 100 ms
    let mut traj = Trajectory::new(MAX_TRAJ_ENTRIES);
    for i in 0..MAX_TRAJ_ENTRIES {
        let angle = i as f32 * 0.1;

        traj.append(TrajEntry {
            time_from_start_ms: (i * 100) as u16,
            point: TrajPoint::new(
                Vector3::new(angle.cos(), angle.sin(), i as f32 * 0.01),
                Vector3::new(-angle.sin(), angle.cos(), 0.1),
            ),
        })
        .unwrap();
    }

    let t0 = Instant::now();

    // ---- Benchmark ----

    c.bench_function("current_goal mid-path", |b| {
        b.iter(|| {
            // Restart so that every iteration walks the cursor from the beginning
            traj.start(t0);
            traj.current_goal(black_box(t0 + Duration::from_millis(5050)))
        })
    });

    c.bench_function("current_goal after end", |b| {
        b.iter(|| {
            traj.start(t0);
            traj.current_goal(black_box(t0 + Duration::from_secs(20)))
        })
    });
}

criterion_group!(benches, traj_goal_benchmark);
criterion_main!(benches);
