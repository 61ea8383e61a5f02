use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use gravflow_common::{SectorKey, TuningConfig};
use gravflow_field::{flow_vector, surface_height};
use gravflow_persist::MemoryBackend;
use gravflow_stream::{WorldStreamer, generate_sector};
use rand::SeedableRng;
use rand::rngs::StdRng;

const DT: f32 = 0.016;

fn bench_generate(sector_count: usize, iterations: usize) {
    let tuning = TuningConfig::default();
    let mut rng = StdRng::seed_from_u64(99);
    let keys: Vec<SectorKey> = (0..sector_count)
        .map(|i| SectorKey::new(i as i32 + 1, -(i as i32) - 1))
        .collect();

    let start = Instant::now();
    for _ in 0..iterations {
        for key in &keys {
            let _ = black_box(generate_sector(black_box(&tuning), *key, &mut rng));
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / (iterations * sector_count) as u32;
    println!(
        "  generate ({sector_count} sectors, {iterations} iters): {per_iter:?}/sector, total {elapsed:?}"
    );
}

fn bench_steady_flight(iterations: usize) {
    let mut streamer =
        WorldStreamer::with_seed(TuningConfig::default(), MemoryBackend::new(), 42);
    let sector_size = streamer.tuning().universe.sector_size;
    streamer.update(Vec3::ZERO, DT);

    let start = Instant::now();
    for i in 0..iterations {
        // Wander within the current sector: no lifecycle work, just ticking
        // and the active-field refresh.
        let x = (i % 100) as f32 * (sector_size * 0.005);
        streamer.update(black_box(Vec3::new(x, 0.0, 0.0)), DT);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  steady flight ({iterations} frames): {per_iter:?}/frame, total {elapsed:?}");
}

fn bench_boundary_crossings(crossings: usize) {
    let mut streamer =
        WorldStreamer::with_seed(TuningConfig::default(), MemoryBackend::new(), 42);
    let sector_size = streamer.tuning().universe.sector_size;
    streamer.update(Vec3::ZERO, DT);

    let start = Instant::now();
    for i in 0..crossings {
        // Hop a full sector per frame down the x axis: worst-case lifecycle
        // load with a fetch, three unloads, and three builds per crossing.
        let x = (i + 1) as f32 * sector_size + 1.0;
        streamer.update(black_box(Vec3::new(x, 0.0, 0.0)), DT);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / crossings as u32;
    println!("  boundary crossing ({crossings} crossings): {per_iter:?}/crossing, total {elapsed:?}");
}

fn bench_field_sampling(samples: usize) {
    let tuning = TuningConfig::default();
    let mut streamer =
        WorldStreamer::with_seed(tuning.clone(), MemoryBackend::new(), 42);
    let sector_size = streamer.tuning().universe.sector_size;
    // Step one sector out so the active set is populated.
    streamer.update(Vec3::ZERO, DT);
    streamer.update(Vec3::new(sector_size + 1.0, 0.0, 0.0), DT);
    let sources = streamer.active_bodies();

    let start = Instant::now();
    for i in 0..samples {
        let x = (i % 500) as f32;
        let z = (i % 311) as f32;
        let _ = black_box(surface_height(
            black_box(&tuning.field),
            x,
            z,
            1.0,
            black_box(sources),
        ));
        let _ = black_box(flow_vector(black_box(&tuning.field), x, z, black_box(sources)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / samples as u32;
    println!(
        "  field sample ({} sources, {samples} samples): {per_iter:?}/sample, total {elapsed:?}",
        sources.len()
    );
}

fn main() {
    println!("=== Sector Streaming Benchmarks ===\n");

    println!("Sector generation:");
    bench_generate(9, 1000);
    bench_generate(100, 100);

    println!("\nStreamer update:");
    bench_steady_flight(10000);
    bench_boundary_crossings(1000);

    println!("\nField evaluation:");
    bench_field_sampling(100000);

    println!("\n=== Done ===");
}
