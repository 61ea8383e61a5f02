use glam::Vec3;
use gravflow_common::{BodyKind, BodySpec, SectorData, SectorKey, TuningConfig};
use rand::Rng;

/// Procedurally generate the content of one sector.
///
/// Always succeeds. Deterministic in distribution only, not in value; the
/// caller owns caching so a key is never rolled twice. Persistence-fetch
/// failures upstream fall back onto this function.
pub fn generate_sector<R: Rng>(tuning: &TuningConfig, key: SectorKey, rng: &mut R) -> SectorData {
    // Safe spawn zone.
    if key == SectorKey::ORIGIN {
        return SectorData::empty();
    }

    let universe = &tuning.universe;
    if rng.r#gen::<f32>() < universe.void_chance {
        return SectorData::empty();
    }

    let center = key.center(universe.sector_size);
    let half = universe.sector_size * universe.footprint;
    let mut bodies = Vec::new();

    let count = rng.gen_range(universe.min_bodies..=universe.max_bodies);
    for _ in 0..count {
        let is_hole = rng.r#gen::<f32>() < tuning.blackholes.chance;
        let (radius, mass, kind) = if is_hole {
            let r = rng.gen_range(tuning.blackholes.radius_min..=tuning.blackholes.radius_max);
            (r, r * r * tuning.blackholes.mass_multiplier, BodyKind::BlackHole)
        } else {
            let r = rng.gen_range(tuning.planets.radius_min..=tuning.planets.radius_max);
            (r, r * tuning.planets.mass_multiplier, BodyKind::Planet)
        };

        // Float the body above the base plane so it clears the deformed grid.
        let y = radius + tuning.planets.clearance + rng.gen_range(0.0..=tuning.planets.height_band);

        bodies.push(BodySpec {
            position: center
                + Vec3::new(
                    rng.gen_range(-half..=half),
                    y,
                    rng.gen_range(-half..=half),
                ),
            radius,
            mass,
            kind,
            color_seed: rng.r#gen::<f32>(),
        });
    }

    let rocks = rng.gen_range(tuning.asteroids.min_count..=tuning.asteroids.max_count);
    for _ in 0..rocks {
        let radius = rng.gen_range(tuning.asteroids.radius_min..=tuning.asteroids.radius_max);
        bodies.push(BodySpec {
            position: center
                + Vec3::new(
                    rng.gen_range(-half..=half),
                    rng.gen_range(tuning.asteroids.band_floor..=tuning.asteroids.band_ceiling),
                    rng.gen_range(-half..=half),
                ),
            radius,
            mass: 0.0,
            kind: BodyKind::Asteroid,
            color_seed: rng.r#gen::<f32>(),
        });
    }

    SectorData { bodies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generate_many(seed: u64) -> Vec<(SectorKey, SectorData)> {
        let tuning = TuningConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        (-5..5)
            .flat_map(|x| (-5..5).map(move |z| SectorKey::new(x, z)))
            .map(|key| (key, generate_sector(&tuning, key, &mut rng)))
            .collect()
    }

    #[test]
    fn origin_is_always_empty() {
        let tuning = TuningConfig::default();
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert!(generate_sector(&tuning, SectorKey::ORIGIN, &mut rng).is_empty());
        }
    }

    #[test]
    fn bodies_stay_inside_the_sector_footprint() {
        let tuning = TuningConfig::default();
        let half = tuning.universe.sector_size * tuning.universe.footprint;
        for (key, data) in generate_many(7) {
            let center = key.center(tuning.universe.sector_size);
            for body in &data.bodies {
                assert!((body.position.x - center.x).abs() <= half + 1e-3);
                assert!((body.position.z - center.z).abs() <= half + 1e-3);
            }
        }
    }

    #[test]
    fn planet_class_bodies_clear_the_base_plane() {
        let tuning = TuningConfig::default();
        for (_, data) in generate_many(11) {
            for body in data.mass_sources() {
                assert!(
                    body.position.y >= body.radius + tuning.planets.clearance,
                    "body at y={} with radius {}",
                    body.position.y,
                    body.radius
                );
            }
        }
    }

    #[test]
    fn asteroids_use_the_shallow_band_and_carry_no_mass() {
        let tuning = TuningConfig::default();
        for (_, data) in generate_many(13) {
            for body in data.bodies.iter().filter(|b| b.kind == BodyKind::Asteroid) {
                assert_eq!(body.mass, 0.0);
                assert!(body.position.y >= tuning.asteroids.band_floor);
                assert!(body.position.y <= tuning.asteroids.band_ceiling);
            }
        }
    }

    #[test]
    fn mass_law_is_kind_dependent() {
        let tuning = TuningConfig::default();
        for (_, data) in generate_many(17) {
            for body in &data.bodies {
                match body.kind {
                    BodyKind::Planet => {
                        let expected = body.radius * tuning.planets.mass_multiplier;
                        assert!((body.mass - expected).abs() < 1e-4);
                    }
                    BodyKind::BlackHole => {
                        let expected = body.radius * body.radius * tuning.blackholes.mass_multiplier;
                        assert!((body.mass - expected).abs() < 1e-4);
                    }
                    BodyKind::Asteroid => assert_eq!(body.mass, 0.0),
                }
            }
        }
    }

    #[test]
    fn body_count_respects_configured_range() {
        let tuning = TuningConfig::default();
        let max = (tuning.universe.max_bodies + tuning.asteroids.max_count) as usize;
        for (key, data) in generate_many(19) {
            if key == SectorKey::ORIGIN {
                continue;
            }
            assert!(data.bodies.len() <= max, "{key}: {} bodies", data.bodies.len());
        }
    }
}
