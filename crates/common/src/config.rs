//! Runtime tuning configuration.
//!
//! [`TuningConfig`] is an explicit, versioned tree of numeric parameters with
//! named sub-structs per subsystem. Every field carries a `serde` default, so
//! a partial JSON file overrides only the values it names; a missing or
//! malformed file falls back to the hardcoded snapshot and is never fatal.
//!
//! The streamer re-reads tuning fields each frame rather than snapshotting,
//! so an external UI may mutate numeric leaves live between frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level tuning tree. One sub-struct per subsystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub universe: UniverseTuning,
    pub planets: PlanetTuning,
    pub blackholes: BlackHoleTuning,
    pub moons: MoonTuning,
    pub asteroids: AsteroidTuning,
    pub field: FieldTuning,
    pub ship: ShipTuning,
}

impl TuningConfig {
    /// Load tuning from a JSON file, falling back to the hardcoded defaults
    /// if the file is missing or malformed. Never fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "tuning config loaded");
                    config
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "malformed tuning config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "tuning config unavailable, using defaults");
                Self::default()
            }
        }
    }
}

/// World partitioning and sector content rolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseTuning {
    /// Side length of one sector in world units.
    pub sector_size: f32,
    /// Streaming window radius in sectors (1 = the 3x3 block).
    pub window_radius: i32,
    /// Chance that a non-origin sector is an empty void.
    pub void_chance: f32,
    /// Planet/black-hole count range per non-void sector.
    pub min_bodies: u32,
    pub max_bodies: u32,
    /// Fraction of the sector side used for placement, per axis, around the
    /// center. 0.4 keeps bodies clear of sector seams.
    pub footprint: f32,
}

impl Default for UniverseTuning {
    fn default() -> Self {
        Self {
            sector_size: 250.0,
            window_radius: 1,
            void_chance: 0.1,
            min_bodies: 1,
            max_bodies: 3,
            footprint: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetTuning {
    pub radius_min: f32,
    pub radius_max: f32,
    /// Mass = radius * multiplier.
    pub mass_multiplier: f32,
    /// Gap between the base plane and the planet underside, so bodies float
    /// above the deformed grid.
    pub clearance: f32,
    /// Extra random height above the clearance.
    pub height_band: f32,
}

impl Default for PlanetTuning {
    fn default() -> Self {
        Self {
            radius_min: 1.0,
            radius_max: 3.0,
            mass_multiplier: 3.0,
            clearance: 2.0,
            height_band: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackHoleTuning {
    /// Chance that a rolled body is a black hole instead of a planet.
    pub chance: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    /// Mass = radius^2 * multiplier. Much heavier than planets.
    pub mass_multiplier: f32,
}

impl Default for BlackHoleTuning {
    fn default() -> Self {
        Self {
            chance: 0.05,
            radius_min: 1.5,
            radius_max: 2.5,
            mass_multiplier: 20.0,
        }
    }
}

/// Moon systems attached to non-black-hole planets at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonTuning {
    pub min_count: u32,
    pub max_count: u32,
    pub radius_min: f32,
    pub radius_max: f32,
    /// Orbit distance beyond the parent radius.
    pub orbit_gap_min: f32,
    pub orbit_gap_max: f32,
    /// Angular speed range, rad/s. Direction is rolled per moon.
    pub orbit_speed_min: f32,
    pub orbit_speed_max: f32,
    /// Vertical offset band around the parent's equator.
    pub height_jitter: f32,
    /// Self-rotation speed range, rad/s.
    pub spin_min: f32,
    pub spin_max: f32,
}

impl Default for MoonTuning {
    fn default() -> Self {
        Self {
            min_count: 1,
            max_count: 3,
            radius_min: 0.5,
            radius_max: 1.2,
            orbit_gap_min: 1.5,
            orbit_gap_max: 3.0,
            orbit_speed_min: 0.4,
            orbit_speed_max: 1.2,
            height_jitter: 0.2,
            spin_min: 0.5,
            spin_max: 2.0,
        }
    }
}

/// Free-floating asteroid hazards (not attached to any planet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTuning {
    pub min_count: u32,
    pub max_count: u32,
    pub radius_min: f32,
    pub radius_max: f32,
    /// Shallow height band, separate from planet placement.
    pub band_floor: f32,
    pub band_ceiling: f32,
    /// Lateral drift speed range (+/- per axis).
    pub drift: f32,
    /// Down-river closing speed range.
    pub fall_min: f32,
    pub fall_max: f32,
    pub spin_min: f32,
    pub spin_max: f32,
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            min_count: 0,
            max_count: 3,
            radius_min: 0.5,
            radius_max: 1.5,
            band_floor: 8.0,
            band_ceiling: 12.0,
            drift: 5.0,
            fall_min: 40.0,
            fall_max: 80.0,
            spin_min: 1.0,
            spin_max: 4.0,
        }
    }
}

/// Gravity field and terrain noise constants. Must match the shader-side
/// constants exactly or the ship floats above (or sinks below) the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    /// Additive softening preventing singularities near a mass source.
    pub softening: f32,
    /// Scale of the well sum subtracted from the surface height.
    pub depth_strength: f32,
    pub noise_amplitude: f32,
    pub noise_frequency: f32,
    pub wave_speed: f32,
    /// Flow blend: pull toward the source vs. swirl around it.
    pub radial_bias: f32,
    pub tangent_bias: f32,
    pub flow_strength: f32,
    /// Constant down-river current added to the summed per-source flow.
    pub base_flow: Vec2,
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            softening: 8.0,
            depth_strength: 20.0,
            noise_amplitude: 4.0,
            noise_frequency: 0.015,
            wave_speed: 0.2,
            radial_bias: 0.5,
            tangent_bias: 1.5,
            flow_strength: 1.0,
            base_flow: Vec2::new(0.0, 0.2),
        }
    }
}

/// Ship kinematics consumed by the headless driver. The ship controller
/// itself is an external collaborator; the core only reads its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    pub forward_speed: f32,
    /// Flight plane height. Terrain noise peaks near 7 units, so the ship
    /// flies at 10 to stay clear of the deformed grid.
    pub flight_height: f32,
    pub collision_radius: f32,
    /// How strongly the local flow vector pushes the ship laterally.
    pub drift_response: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            forward_speed: 60.0,
            flight_height: 10.0,
            collision_radius: 1.2,
            drift_response: 1.0,
        }
    }
}
