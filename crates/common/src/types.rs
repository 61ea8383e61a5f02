use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a live (resident) body instance.
///
/// Content descriptors have no identity of their own; ids are minted when a
/// sector is built and die with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub Uuid);

impl BodyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::new()
    }
}

/// A 2D sector coordinate in the infinite world grid (Y is ignored for
/// partitioning). Replaces the string-concatenated `"x:z"` keys of earlier
/// designs so negative coordinates hash and compare exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectorKey {
    pub x: i32,
    pub z: i32,
}

impl SectorKey {
    /// The safe spawn sector. Always generated empty.
    pub const ORIGIN: SectorKey = SectorKey { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Discretize a world position into its sector coordinate
    /// (integer floor division by sector size).
    pub fn from_position(pos: Vec3, sector_size: f32) -> Self {
        Self {
            x: (pos.x / sector_size).floor() as i32,
            z: (pos.z / sector_size).floor() as i32,
        }
    }

    /// World-space center of this sector.
    pub fn center(&self, sector_size: f32) -> Vec3 {
        Vec3::new(
            self.x as f32 * sector_size,
            0.0,
            self.z as f32 * sector_size,
        )
    }

    /// The square block of keys within `radius` cells of this key.
    /// `radius = 1` is the 3x3 streaming window.
    pub fn window(&self, radius: i32) -> Vec<SectorKey> {
        let mut keys = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
        for x in (self.x - radius)..=(self.x + radius) {
            for z in (self.z - radius)..=(self.z + radius) {
                keys.push(SectorKey::new(x, z));
            }
        }
        keys
    }

    /// Filesystem-safe form (`:` is not portable in filenames).
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.x, self.z)
    }
}

impl fmt::Display for SectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.z)
    }
}

/// What a content descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Planet,
    BlackHole,
    Asteroid,
}

impl BodyKind {
    /// Planets and black holes contribute to the gravity field;
    /// asteroids are visual hazards only.
    pub fn is_mass_source(&self) -> bool {
        matches!(self, BodyKind::Planet | BodyKind::BlackHole)
    }
}

/// Content descriptor for one body in a sector.
///
/// This is the persisted form: pure data, no scene state. Live bodies are
/// built from specs at residency time and dropped at unload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub position: Vec3,
    pub radius: f32,
    pub mass: f32,
    pub kind: BodyKind,
    /// Hue seed in [0, 1) for the renderer.
    pub color_seed: f32,
}

/// Generated-or-persisted content of one sector: an ordered list of body
/// descriptors. A key maps to exactly one `SectorData` for the lifetime of
/// the process once cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorData {
    pub bodies: Vec<BodySpec>,
}

impl SectorData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Descriptors that perturb the gravity field.
    pub fn mass_sources(&self) -> impl Iterator<Item = &BodySpec> {
        self.bodies.iter().filter(|b| b.kind.is_mass_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_id_uniqueness() {
        assert_ne!(BodyId::new(), BodyId::new());
    }

    #[test]
    fn key_from_position_floors() {
        let key = SectorKey::from_position(Vec3::new(10.0, 0.0, 10.0), 250.0);
        assert_eq!(key, SectorKey::ORIGIN);

        let key = SectorKey::from_position(Vec3::new(251.0, 0.0, -5.0), 250.0);
        assert_eq!(key, SectorKey::new(1, -1));

        // Negative coordinates must floor, not truncate toward zero.
        let key = SectorKey::from_position(Vec3::new(-0.5, 0.0, -250.5), 250.0);
        assert_eq!(key, SectorKey::new(-1, -2));
    }

    #[test]
    fn window_radius_one_is_3x3() {
        let keys = SectorKey::new(2, -1).window(1);
        assert_eq!(keys.len(), 9);
        assert!(keys.contains(&SectorKey::new(1, -2)));
        assert!(keys.contains(&SectorKey::new(3, 0)));
        assert!(!keys.contains(&SectorKey::new(4, 0)));
    }

    #[test]
    fn key_display_and_file_stem() {
        let key = SectorKey::new(-3, 7);
        assert_eq!(key.to_string(), "-3:7");
        assert_eq!(key.file_stem(), "-3_7");
    }

    #[test]
    fn mass_sources_exclude_asteroids() {
        let data = SectorData {
            bodies: vec![
                BodySpec {
                    position: Vec3::ZERO,
                    radius: 2.0,
                    mass: 6.0,
                    kind: BodyKind::Planet,
                    color_seed: 0.5,
                },
                BodySpec {
                    position: Vec3::ONE,
                    radius: 1.0,
                    mass: 0.0,
                    kind: BodyKind::Asteroid,
                    color_seed: 0.1,
                },
            ],
        };
        assert_eq!(data.mass_sources().count(), 1);
    }
}
