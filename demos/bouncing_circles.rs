//! Bouncing circles
//!
//! Moves a field of circles inside a box for a number of frames and runs the
//! parallel broad phase on every frame, logging how many pairs it finds.
//!
//! Run with `RUST_LOG=info cargo run --example bouncing_circles`.
//! An optional first argument names a TOML file with thread pool settings.

use anyhow::Result;
use hearth_broadphase::{
    glam::Vec2, BroadPhaseStats, Circle, SweepAndPrune, ThreadPool, ThreadPoolConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};

const CIRCLE_COUNT: usize = 5_000;
const FRAME_COUNT: usize = 120;
const WORLD_SIZE: f32 = 1_000.0;
const TIME_STEP: f32 = 1.0 / 60.0;

struct Body {
    circle: Circle,
    velocity: Vec2,
}

fn spawn_bodies(rng: &mut StdRng) -> Vec<Body> {
    (0..CIRCLE_COUNT)
        .map(|_| Body {
            circle: Circle::new(
                Vec2::new(rng.gen_range(0.0..WORLD_SIZE), rng.gen_range(0.0..WORLD_SIZE)),
                rng.gen_range(1.0..4.0),
            ),
            velocity: Vec2::new(rng.gen_range(-80.0..80.0), rng.gen_range(-80.0..80.0)),
        })
        .collect()
}

fn step(bodies: &mut [Body]) {
    for body in bodies {
        body.circle.position += body.velocity * TIME_STEP;

        // Reflect off the walls
        let r = body.circle.radius;
        let p = &mut body.circle.position;
        if p.x < r || p.x > WORLD_SIZE - r {
            body.velocity.x = -body.velocity.x;
            p.x = p.x.clamp(r, WORLD_SIZE - r);
        }
        if p.y < r || p.y > WORLD_SIZE - r {
            body.velocity.y = -body.velocity.y;
            p.y = p.y.clamp(r, WORLD_SIZE - r);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ThreadPoolConfig::from_file(&path)?,
        None => ThreadPoolConfig::default(),
    };
    let pool = ThreadPool::with_config(&config)?;
    let n_workers = pool.worker_count();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut bodies = spawn_bodies(&mut rng);
    let mut circles: Vec<Circle> = Vec::with_capacity(bodies.len());
    let mut sap = SweepAndPrune::with_capacity(bodies.len());

    let mut total = BroadPhaseStats::default();
    let touching = AtomicUsize::new(0);

    for frame in 0..FRAME_COUNT {
        step(&mut bodies);

        circles.clear();
        circles.extend(bodies.iter().map(|b| b.circle));
        sap.populate(&circles);

        // Narrow phase on reported pairs: exact circle-circle test
        let stats = sap.for_each_unique_index_pair_with_stats(n_workers, &pool, |i, j| {
            let (a, b) = (&circles[i], &circles[j]);
            let reach = a.radius + b.radius;
            if a.position.distance_squared(b.position) <= reach * reach {
                touching.fetch_add(1, Ordering::Relaxed);
            }
        });

        if frame % 30 == 0 {
            let mut near_center = 0usize;
            let _ = sap.for_each_index_in_radius(Vec2::splat(WORLD_SIZE * 0.5), 50.0, |_| {
                near_center += 1;
                ControlFlow::Continue(())
            });

            log::info!(
                "[bouncing_circles] frame {}: {} pairs, {} candidates, {} near center, {}us",
                frame,
                stats.pair_count,
                stats.candidates_tested,
                near_center,
                stats.elapsed_us
            );
        }

        total.pair_count += stats.pair_count;
        total.candidates_tested += stats.candidates_tested;
        total.elapsed_us += stats.elapsed_us;
    }

    println!(
        "{} frames, {} circles, {} workers: {} box pairs, {} touching, {:.1}us per frame",
        FRAME_COUNT,
        CIRCLE_COUNT,
        n_workers,
        total.pair_count,
        touching.load(Ordering::Relaxed),
        total.elapsed_us as f64 / FRAME_COUNT as f64
    );

    Ok(())
}
