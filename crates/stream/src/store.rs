use crate::bodies::Body;
use gravflow_common::{SectorData, SectorKey};
use std::collections::{HashMap, HashSet};

/// In-memory sector state: the content cache, the resident body map, and
/// the in-flight fetch set.
///
/// The content cache is memoized for the process lifetime; unloading a
/// sector drops its live bodies but keeps the data, so re-entry rebuilds
/// identical descriptors without regeneration.
#[derive(Debug, Default)]
pub struct SectorStore {
    data: HashMap<SectorKey, SectorData>,
    resident: HashMap<SectorKey, Vec<Body>>,
    in_flight: HashSet<SectorKey>,
}

impl SectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_data(&self, key: SectorKey) -> bool {
        self.data.contains_key(&key)
    }

    pub fn data(&self, key: SectorKey) -> Option<&SectorData> {
        self.data.get(&key)
    }

    /// Cache content for a key. The first insertion wins: a key maps to
    /// exactly one `SectorData` for the lifetime of the process, so a late
    /// duplicate resolution cannot change already-cached content.
    pub fn insert_data(&mut self, key: SectorKey, data: SectorData) -> &SectorData {
        self.data.entry(key).or_insert(data)
    }

    pub fn cached_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_resident(&self, key: SectorKey) -> bool {
        self.resident.contains_key(&key)
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    pub fn resident_keys(&self) -> impl Iterator<Item = SectorKey> + '_ {
        self.resident.keys().copied()
    }

    /// All live bodies across resident sectors.
    pub fn resident_bodies(&self) -> impl Iterator<Item = &Body> {
        self.resident.values().flatten()
    }

    pub fn bodies(&self, key: SectorKey) -> Option<&[Body]> {
        self.resident.get(&key).map(Vec::as_slice)
    }

    /// Install built bodies for a resident sector.
    pub fn build(&mut self, key: SectorKey, bodies: Vec<Body>) {
        self.resident.insert(key, bodies);
    }

    /// Drop a sector's live bodies (moon systems go with their parents).
    /// Returns how many bodies were released. Cached data is retained.
    pub fn unload(&mut self, key: SectorKey) -> usize {
        self.resident.remove(&key).map_or(0, |bodies| bodies.len())
    }

    /// Advance local motion of every resident body.
    pub fn tick_all(&mut self, dt: f32) {
        for bodies in self.resident.values_mut() {
            for body in bodies {
                body.tick(dt);
            }
        }
    }

    pub fn mark_in_flight(&mut self, key: SectorKey) {
        self.in_flight.insert(key);
    }

    pub fn clear_in_flight(&mut self, key: SectorKey) {
        self.in_flight.remove(&key);
    }

    pub fn is_in_flight(&self, key: SectorKey) -> bool {
        self.in_flight.contains(&key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Body;
    use glam::Vec3;
    use gravflow_common::{BodyKind, BodySpec, TuningConfig};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn one_planet() -> SectorData {
        SectorData {
            bodies: vec![BodySpec {
                position: Vec3::new(50.0, 5.0, 50.0),
                radius: 2.0,
                mass: 6.0,
                kind: BodyKind::Planet,
                color_seed: 0.5,
            }],
        }
    }

    fn build_bodies(data: &SectorData) -> Vec<Body> {
        let tuning = TuningConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        data.bodies
            .iter()
            .map(|spec| Body::build(&tuning, *spec, &mut rng))
            .collect()
    }

    #[test]
    fn first_data_insertion_wins() {
        let mut store = SectorStore::new();
        let key = SectorKey::new(1, 1);

        store.insert_data(key, one_planet());
        store.insert_data(key, SectorData::empty());

        assert_eq!(store.data(key), Some(&one_planet()));
    }

    #[test]
    fn unload_drops_bodies_but_keeps_data() {
        let mut store = SectorStore::new();
        let key = SectorKey::new(2, 0);
        let data = one_planet();

        store.insert_data(key, data.clone());
        store.build(key, build_bodies(&data));
        assert!(store.is_resident(key));

        let dropped = store.unload(key);
        assert_eq!(dropped, 1);
        assert!(!store.is_resident(key));
        assert!(store.has_data(key));
    }

    #[test]
    fn unload_of_absent_key_is_a_noop() {
        let mut store = SectorStore::new();
        assert_eq!(store.unload(SectorKey::new(9, 9)), 0);
    }

    #[test]
    fn in_flight_markers_round_trip() {
        let mut store = SectorStore::new();
        let key = SectorKey::new(0, -4);

        store.mark_in_flight(key);
        assert!(store.is_in_flight(key));
        assert_eq!(store.in_flight_count(), 1);

        store.clear_in_flight(key);
        assert!(!store.is_in_flight(key));
        assert_eq!(store.in_flight_count(), 0);
    }

    #[test]
    fn resident_bodies_spans_all_sectors() {
        let mut store = SectorStore::new();
        for x in 0..3 {
            let key = SectorKey::new(x, 0);
            let data = one_planet();
            store.insert_data(key, data.clone());
            store.build(key, build_bodies(&data));
        }
        assert_eq!(store.resident_bodies().count(), 3);
    }
}
