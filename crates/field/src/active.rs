use glam::Vec3;
use gravflow_common::{BodyId, BodyKind};

/// Fixed capacity of the shader's parallel uniform arrays.
pub const MAX_ACTIVE_SOURCES: usize = 8;

/// Position written into unused uniform slots. Far enough that the shader's
/// loop-and-break pattern contributes nothing even without the mass guard.
pub const FAR_SENTINEL: f32 = 99_999.0;

/// A mass source as seen by the projector: a view over a resident body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBody {
    pub id: BodyId,
    pub position: Vec3,
    pub radius: f32,
    pub mass: f32,
    pub kind: BodyKind,
}

/// The renderer uniform contract: fixed-size parallel arrays of source
/// position and mass, a count, and a time value. This is the sole channel
/// from the core to the visual deformation shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityUniforms {
    pub positions: [Vec3; MAX_ACTIVE_SOURCES],
    pub masses: [f32; MAX_ACTIVE_SOURCES],
    pub count: u32,
    pub time: f32,
}

impl Default for GravityUniforms {
    fn default() -> Self {
        Self {
            positions: [Vec3::splat(FAR_SENTINEL); MAX_ACTIVE_SOURCES],
            masses: [0.0; MAX_ACTIVE_SOURCES],
            count: 0,
            time: 0.0,
        }
    }
}

/// The bounded, distance-sorted subset of resident mass sources currently
/// influencing rendering and gameplay.
///
/// Refreshed every frame; not an owner, just a view. Bodies outside the
/// top [`MAX_ACTIVE_SOURCES`] by distance affect neither the shader nor
/// ship physics.
#[derive(Debug, Default)]
pub struct ActiveField {
    bodies: Vec<ActiveBody>,
    uniforms: GravityUniforms,
}

impl ActiveField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the active set from candidate sources and republish the
    /// uniforms. Sorts ascending by squared distance to the ship and
    /// truncates to capacity; unused slots are zero-filled.
    pub fn refresh(
        &mut self,
        candidates: impl IntoIterator<Item = ActiveBody>,
        ship_pos: Vec3,
        time: f32,
    ) {
        self.bodies.clear();
        self.bodies.extend(candidates);
        self.bodies.sort_by(|a, b| {
            let da = a.position.distance_squared(ship_pos);
            let db = b.position.distance_squared(ship_pos);
            da.total_cmp(&db)
        });
        self.bodies.truncate(MAX_ACTIVE_SOURCES);

        self.uniforms.count = self.bodies.len() as u32;
        self.uniforms.time = time;
        for slot in 0..MAX_ACTIVE_SOURCES {
            if let Some(body) = self.bodies.get(slot) {
                self.uniforms.positions[slot] = body.position;
                self.uniforms.masses[slot] = body.mass;
            } else {
                self.uniforms.positions[slot] = Vec3::splat(FAR_SENTINEL);
                self.uniforms.masses[slot] = 0.0;
            }
        }
    }

    /// The authoritative active-source list, nearest first.
    pub fn bodies(&self) -> &[ActiveBody] {
        &self.bodies
    }

    pub fn uniforms(&self) -> &GravityUniforms {
        &self.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f32, z: f32, mass: f32) -> ActiveBody {
        ActiveBody {
            id: BodyId::new(),
            position: Vec3::new(x, 0.0, z),
            radius: 1.0,
            mass,
            kind: BodyKind::Planet,
        }
    }

    #[test]
    fn truncates_to_capacity() {
        let mut field = ActiveField::new();
        let candidates: Vec<_> = (0..20).map(|i| body_at(i as f32 * 10.0, 0.0, 5.0)).collect();
        field.refresh(candidates, Vec3::ZERO, 0.0);

        assert_eq!(field.bodies().len(), MAX_ACTIVE_SOURCES);
        assert_eq!(field.uniforms().count, MAX_ACTIVE_SOURCES as u32);
    }

    #[test]
    fn sorted_ascending_by_squared_distance() {
        let mut field = ActiveField::new();
        let candidates = vec![
            body_at(300.0, 0.0, 1.0),
            body_at(10.0, 0.0, 2.0),
            body_at(-50.0, 0.0, 3.0),
        ];
        field.refresh(candidates, Vec3::ZERO, 0.0);

        let dists: Vec<f32> = field
            .bodies()
            .iter()
            .map(|b| b.position.distance_squared(Vec3::ZERO))
            .collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]), "not sorted: {dists:?}");
        assert_eq!(field.bodies()[0].mass, 2.0);
    }

    #[test]
    fn unused_slots_are_zero_filled() {
        let mut field = ActiveField::new();
        field.refresh(vec![body_at(5.0, 5.0, 9.0)], Vec3::ZERO, 1.0);

        let u = field.uniforms();
        assert_eq!(u.count, 1);
        assert_eq!(u.masses[0], 9.0);
        for slot in 1..MAX_ACTIVE_SOURCES {
            assert_eq!(u.masses[slot], 0.0);
            assert_eq!(u.positions[slot], Vec3::splat(FAR_SENTINEL));
        }
    }

    #[test]
    fn refresh_replaces_previous_set() {
        let mut field = ActiveField::new();
        field.refresh(vec![body_at(1.0, 0.0, 1.0)], Vec3::ZERO, 0.0);
        field.refresh(std::iter::empty(), Vec3::ZERO, 2.0);

        assert!(field.bodies().is_empty());
        assert_eq!(field.uniforms().count, 0);
        assert_eq!(field.uniforms().time, 2.0);
        assert_eq!(field.uniforms().masses[0], 0.0);
    }
}
