use crate::bodies::{Body, Hazard};
use crate::generator::generate_sector;
use crate::store::SectorStore;
use glam::{Vec2, Vec3};
use gravflow_common::{SectorData, SectorKey, TuningConfig};
use gravflow_field::{ActiveBody, ActiveField, GravityUniforms, flow_vector, surface_height};
use gravflow_persist::{BatchId, FetchOutcome, SectorBackend};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// Session counters for instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Sector-boundary crossings (lifecycle passes run).
    pub boundary_crossings: u64,
    /// Sectors that became resident (bodies built).
    pub sectors_built: u64,
    /// Sectors whose bodies were dropped.
    pub sectors_unloaded: u64,
    /// Load batches submitted to the backend.
    pub fetch_batches: u64,
    /// Load batches that failed outright.
    pub fetch_failures: u64,
    /// Sectors synthesized locally (not found or fetch failed).
    pub sectors_generated: u64,
    /// Newly generated sectors written back to the backend.
    pub sectors_saved: u64,
}

/// The world streamer: tracks the ship's sector, keeps the 3x3 window of
/// sectors resident, and republishes the gravity field every frame.
///
/// Single-threaded and frame-driven. `update` is called once per rendered
/// frame; the expensive lifecycle pass runs only when the ship's
/// discretized sector coordinate changes. The only suspension point is the
/// sector fetch, which resolves through the backend's poll queue while
/// gameplay proceeds on resident sectors.
pub struct WorldStreamer<B: SectorBackend> {
    tuning: TuningConfig,
    backend: B,
    store: SectorStore,
    active: ActiveField,
    current_sector: Option<SectorKey>,
    pending_batches: HashMap<BatchId, Vec<SectorKey>>,
    next_batch: BatchId,
    rng: StdRng,
    time: f32,
    stats: StreamStats,
}

impl<B: SectorBackend> WorldStreamer<B> {
    pub fn new(tuning: TuningConfig, backend: B) -> Self {
        Self::with_seed(tuning, backend, rand::random())
    }

    /// Fixed generation seed, for reproducible tests and headless runs.
    pub fn with_seed(tuning: TuningConfig, backend: B, seed: u64) -> Self {
        Self {
            tuning,
            backend,
            store: SectorStore::new(),
            active: ActiveField::new(),
            current_sector: None,
            pending_batches: HashMap::new(),
            next_batch: 0,
            rng: StdRng::seed_from_u64(seed),
            time: 0.0,
            stats: StreamStats::default(),
        }
    }

    /// One simulation step. Reads the ship position, runs the sector
    /// lifecycle if a boundary was crossed, resolves any pending fetches,
    /// ticks resident bodies, and refreshes the active field.
    pub fn update(&mut self, ship_pos: Vec3, dt: f32) {
        let _span = tracing::info_span!("stream_update").entered();
        self.time += dt;

        let sector = SectorKey::from_position(ship_pos, self.tuning.universe.sector_size);
        if self.current_sector != Some(sector) {
            self.current_sector = Some(sector);
            self.stats.boundary_crossings += 1;
            self.cross_into(sector);
        }

        self.resolve_fetches();
        self.build_ready(sector);
        self.store.tick_all(dt);

        self.active.refresh(
            self.store.resident_bodies().filter_map(Body::to_active),
            ship_pos,
            self.time,
        );
    }

    /// Lifecycle pass for a sector-boundary crossing. The unload pass runs
    /// first so stale sectors are freed regardless of fetch latency.
    fn cross_into(&mut self, sector: SectorKey) {
        let needed = sector.window(self.tuning.universe.window_radius);

        let stale: Vec<SectorKey> = self
            .store
            .resident_keys()
            .filter(|key| !needed.contains(key))
            .collect();
        for key in stale {
            let dropped = self.store.unload(key);
            self.stats.sectors_unloaded += 1;
            tracing::debug!(%key, bodies = dropped, "sector unloaded");
        }

        let missing: Vec<SectorKey> = needed
            .into_iter()
            .filter(|key| !self.store.has_data(*key) && !self.store.is_in_flight(*key))
            .collect();
        if missing.is_empty() {
            return;
        }

        // Claim every key before the request leaves, so a second crossing
        // cannot issue a duplicate fetch while this one is in flight.
        for key in &missing {
            self.store.mark_in_flight(*key);
        }
        let batch = self.next_batch;
        self.next_batch += 1;
        tracing::debug!(batch, keys = missing.len(), "sector fetch issued");
        self.backend.submit_load(batch, &missing);
        self.pending_batches.insert(batch, missing);
        self.stats.fetch_batches += 1;
    }

    /// Drain resolved batches. Keys found in storage are cached as-is; keys
    /// the store has never seen are generated locally and written back
    /// fire-and-forget. A failed batch degrades to local generation for all
    /// of its keys. Every path clears the in-flight markers.
    fn resolve_fetches(&mut self) {
        for (batch, outcome) in self.backend.poll_loads() {
            let Some(keys) = self.pending_batches.remove(&batch) else {
                continue;
            };

            match outcome {
                FetchOutcome::Resolved(mut found) => {
                    let mut fresh: HashMap<SectorKey, SectorData> = HashMap::new();
                    for key in keys {
                        match found.remove(&key) {
                            Some(data) => {
                                self.store.insert_data(key, data);
                            }
                            None => {
                                let data = generate_sector(&self.tuning, key, &mut self.rng);
                                self.stats.sectors_generated += 1;
                                fresh.insert(key, self.store.insert_data(key, data).clone());
                            }
                        }
                        self.store.clear_in_flight(key);
                    }

                    if !fresh.is_empty() {
                        match self.backend.save(&fresh) {
                            Ok(()) => self.stats.sectors_saved += fresh.len() as u64,
                            Err(err) => {
                                tracing::warn!(batch, %err, "sector save failed, dropping")
                            }
                        }
                    }
                }
                FetchOutcome::Failed(err) => {
                    tracing::warn!(batch, %err, "sector fetch failed, generating locally");
                    self.stats.fetch_failures += 1;
                    for key in keys {
                        let data = generate_sector(&self.tuning, key, &mut self.rng);
                        self.stats.sectors_generated += 1;
                        self.store.insert_data(key, data);
                        self.store.clear_in_flight(key);
                    }
                }
            }
        }
    }

    /// Build bodies for every needed sector whose data has resolved but has
    /// no live bodies yet. Runs every frame: with a slow backend, data can
    /// arrive many frames after the boundary crossing. Keys outside the
    /// window are never built, even if a late fetch populated their cache.
    fn build_ready(&mut self, sector: SectorKey) {
        for key in sector.window(self.tuning.universe.window_radius) {
            if self.store.is_resident(key) || !self.store.has_data(key) {
                continue;
            }
            let specs = self
                .store
                .data(key)
                .map(|data| data.bodies.clone())
                .unwrap_or_default();
            let bodies: Vec<Body> = specs
                .into_iter()
                .map(|spec| Body::build(&self.tuning, spec, &mut self.rng))
                .collect();
            tracing::debug!(%key, bodies = bodies.len(), "sector resident");
            self.store.build(key, bodies);
            self.stats.sectors_built += 1;
        }
    }

    /// Height of the deformed grid under a world coordinate, evaluated over
    /// the current active set with the same formula the shader uses.
    pub fn surface_height_at(&self, x: f32, z: f32) -> f32 {
        surface_height(&self.tuning.field, x, z, self.time, self.active.bodies())
    }

    /// Drift current at a world position, for the ship controller.
    pub fn flow_at(&self, pos: Vec3) -> Vec2 {
        flow_vector(&self.tuning.field, pos.x, pos.z, self.active.bodies())
    }

    /// Collision candidates across all resident sectors: bodies plus their
    /// attached moons.
    pub fn hazards(&self) -> Vec<Hazard> {
        let mut out = Vec::new();
        for body in self.store.resident_bodies() {
            body.hazards(&mut out);
        }
        out
    }

    /// The authoritative active mass-source list, nearest first.
    pub fn active_bodies(&self) -> &[ActiveBody] {
        self.active.bodies()
    }

    /// The renderer uniform block for the deformation shader.
    pub fn uniforms(&self) -> &GravityUniforms {
        self.active.uniforms()
    }

    pub fn current_sector(&self) -> Option<SectorKey> {
        self.current_sector
    }

    pub fn store(&self) -> &SectorStore {
        &self.store
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn tuning(&self) -> &TuningConfig {
        &self.tuning
    }

    /// Live tuning access for external UI sliders. Fields are re-read every
    /// frame, so mutations take effect on the next update without restart.
    pub fn tuning_mut(&mut self) -> &mut TuningConfig {
        &mut self.tuning
    }
}
