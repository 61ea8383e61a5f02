//! Shared types for the gravflow core.
//!
//! # Invariants
//! - `SectorKey` is the only world-partition identity; no string keys.
//! - `TuningConfig` always yields a usable snapshot (hardcoded fallback).

mod config;
mod types;

pub use config::{
    AsteroidTuning, BlackHoleTuning, FieldTuning, MoonTuning, PlanetTuning, ShipTuning,
    TuningConfig, UniverseTuning,
};
pub use types::{BodyId, BodyKind, BodySpec, SectorData, SectorKey};

pub fn crate_info() -> &'static str {
    "gravflow-common v0.1.0"
}
