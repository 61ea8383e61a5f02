use crate::active::ActiveBody;
use crate::noise::fbm;
use glam::{Vec2, Vec3};
use gravflow_common::FieldTuning;

/// Softened inverse-square attraction magnitude of one source.
///
/// The softening constant keeps the well finite as `dist_sq` approaches
/// zero; it must match the shader uniform.
pub fn well(dist_sq: f32, mass: f32, softening: f32) -> f32 {
    mass / (dist_sq + softening)
}

/// Height of the deformed grid surface at `(x, z)` and time `t`.
///
/// Terrain noise lifts the surface, gravity wells pull it down. Both the
/// grid deformation and the ship's height queries go through this one
/// formula so they can never disagree.
pub fn surface_height(tuning: &FieldTuning, x: f32, z: f32, t: f32, sources: &[ActiveBody]) -> f32 {
    let mut w = 0.0;
    for source in sources {
        let dx = x - source.position.x;
        let dz = z - source.position.z;
        w += well(dx * dx + dz * dz, source.mass, tuning.softening);
    }

    let terrain = fbm(x, z, t, tuning.noise_frequency, tuning.wave_speed) * tuning.noise_amplitude;
    terrain - w * tuning.depth_strength
}

/// Combined drift current at `(x, z)`.
///
/// Per source: a blend of the radial direction toward the source and its
/// perpendicular, scaled by the softened inverse-square law. The sum is
/// scaled by flow strength and added to the constant down-river current.
pub fn flow_vector(tuning: &FieldTuning, x: f32, z: f32, sources: &[ActiveBody]) -> Vec2 {
    let query = Vec2::new(x, z);
    let mut flow = Vec2::ZERO;
    for source in sources {
        let d = Vec2::new(source.position.x, source.position.z) - query;
        let r2 = d.length_squared() + tuning.softening;
        let radial = (d + Vec2::splat(1e-6)).normalize_or_zero();
        let tangent = Vec2::new(-radial.y, radial.x);
        flow += (radial * tuning.radial_bias + tangent * tuning.tangent_bias) * (source.mass / r2);
    }
    tuning.base_flow + flow * tuning.flow_strength
}

/// Drift current at a world position, sampling the XZ plane.
pub fn flow_at(tuning: &FieldTuning, pos: Vec3, sources: &[ActiveBody]) -> Vec2 {
    flow_vector(tuning, pos.x, pos.z, sources)
}
