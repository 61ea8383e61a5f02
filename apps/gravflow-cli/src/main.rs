use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glam::Vec3;
use gravflow_common::TuningConfig;
use gravflow_persist::{FileBackend, MemoryBackend, SectorBackend};
use gravflow_stream::WorldStreamer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gravflow-cli", about = "CLI tool for gravflow operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Tuning config file (JSON). Missing or malformed falls back to defaults.
    #[arg(long)]
    tuning: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Fly a headless ship down-river and stream the world around it
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "3600")]
        frames: u64,
        /// Fixed timestep in seconds
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Generation seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Persist sectors to this store directory (in-memory when omitted)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Probe the gravity field around a world coordinate
    Field {
        #[arg(short, long, default_value = "0")]
        x: f32,
        #[arg(short, long, default_value = "300")]
        z: f32,
        /// Generation seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let tuning = match &cli.tuning {
        Some(path) => TuningConfig::load_or_default(path),
        None => TuningConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("gravflow-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", gravflow_common::crate_info());
            println!("field: {}", gravflow_field::crate_info());
            println!("persist: {}", gravflow_persist::crate_info());
            println!("stream: {}", gravflow_stream::crate_info());
        }
        Commands::Run {
            frames,
            dt,
            seed,
            store,
        } => {
            let backend: Box<dyn SectorBackend> = match &store {
                Some(path) => {
                    println!("Store: {}", path.display());
                    Box::new(FileBackend::open(path)?)
                }
                None => Box::new(MemoryBackend::new()),
            };
            run_flight(tuning, backend, frames, dt, seed);
        }
        Commands::Field { x, z, seed } => {
            probe_field(tuning, x, z, seed);
        }
    }

    Ok(())
}

/// Headless flight: the ship holds its flight plane, pushes down-river at
/// constant speed, and lets the local flow current drift it laterally.
fn run_flight(tuning: TuningConfig, backend: Box<dyn SectorBackend>, frames: u64, dt: f32, seed: u64) {
    let ship_tuning = tuning.ship.clone();
    let mut streamer = WorldStreamer::with_seed(tuning, backend, seed);

    let mut ship = Vec3::new(0.0, ship_tuning.flight_height, 0.0);
    let mut near_misses = 0u64;
    let mut collisions = 0u64;

    println!("Flight: {frames} frames at dt={dt}, seed={seed}");

    for _ in 0..frames {
        streamer.update(ship, dt);

        let flow = streamer.flow_at(ship);
        ship.x += flow.x * ship_tuning.drift_response * dt;
        ship.z += (ship_tuning.forward_speed + flow.y * ship_tuning.drift_response) * dt;

        for hazard in streamer.hazards() {
            let gap = ship.distance(hazard.position) - hazard.radius - ship_tuning.collision_radius;
            if gap < 0.0 {
                collisions += 1;
            } else if gap < hazard.radius {
                near_misses += 1;
            }
        }
    }

    let stats = streamer.stats();
    println!();
    println!(
        "Final position: ({:.1}, {:.1}, {:.1}) in sector {}",
        ship.x,
        ship.y,
        ship.z,
        streamer
            .current_sector()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".into())
    );
    println!(
        "Streaming: {} crossings, {} batches ({} failed), {} built, {} unloaded",
        stats.boundary_crossings,
        stats.fetch_batches,
        stats.fetch_failures,
        stats.sectors_built,
        stats.sectors_unloaded
    );
    println!(
        "Content: {} generated, {} saved, {} cached",
        stats.sectors_generated,
        stats.sectors_saved,
        streamer.store().cached_count()
    );
    println!(
        "Active field: {} sources, surface {:.2} under ship",
        streamer.active_bodies().len(),
        streamer.surface_height_at(ship.x, ship.z)
    );
    println!("Hazards: {collisions} collision frames, {near_misses} near-miss frames");
}

/// One streamed frame at the probe point, then a sample grid of surface
/// heights and flow vectors around it.
fn probe_field(tuning: TuningConfig, x: f32, z: f32, seed: u64) {
    let mut streamer = WorldStreamer::with_seed(tuning, MemoryBackend::new(), seed);
    let probe = Vec3::new(x, 0.0, z);
    streamer.update(probe, 0.016);

    println!("Probe at ({x:.1}, {z:.1}), sector {}", streamer.current_sector().map(|s| s.to_string()).unwrap_or_default());
    println!("Active sources (nearest first):");
    for body in streamer.active_bodies() {
        println!(
            "  {:?} at ({:.1}, {:.1}, {:.1}), radius {:.2}, mass {:.2}",
            body.kind, body.position.x, body.position.y, body.position.z, body.radius, body.mass
        );
    }

    println!("\nSurface height / flow, 5x5 grid, 25-unit spacing:");
    for dz in -2..=2 {
        for dx in -2..=2 {
            let px = x + dx as f32 * 25.0;
            let pz = z + dz as f32 * 25.0;
            let h = streamer.surface_height_at(px, pz);
            let f = streamer.flow_at(Vec3::new(px, 0.0, pz));
            print!("  {h:7.2} ({:+.2},{:+.2})", f.x, f.y);
        }
        println!();
    }
}
