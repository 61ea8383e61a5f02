use glam::Vec3;
use gravflow_common::{BodyId, BodyKind, BodySpec, MoonTuning, TuningConfig};
use gravflow_field::ActiveBody;
use rand::Rng;

/// A moon orbiting its parent planet, expressed in the parent's local frame
/// so it moves rigidly with the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Moon {
    pub radius: f32,
    pub orbit_radius: f32,
    pub angle: f32,
    /// Signed angular speed, rad/s. Direction rolled at build time.
    pub speed: f32,
    /// Vertical offset from the parent's equator.
    pub height: f32,
    pub spin_axis: Vec3,
    pub spin_speed: f32,
    pub spin_angle: f32,
}

impl Moon {
    /// Offset from the parent's center at the current orbital angle.
    pub fn local_offset(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.orbit_radius,
            self.height,
            self.angle.sin() * self.orbit_radius,
        )
    }
}

/// Per-kind motion state of a live body. Replaces the duck-typed
/// mesh-or-wrapper objects of earlier designs with an explicit variant.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyMotion {
    /// Static well with an attached moon system.
    Planet { moons: Vec<Moon> },
    /// Static well, no children.
    BlackHole,
    /// Free-floating hazard: independent linear velocity, no field coupling.
    Asteroid {
        velocity: Vec3,
        spin_axis: Vec3,
        spin_speed: f32,
        spin_angle: f32,
    },
}

/// A collision candidate with a world position and radius, uniform across
/// planets, black holes, moons, and asteroids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub position: Vec3,
    pub radius: f32,
}

/// A live body resident in the scene, built from a [`BodySpec`] when its
/// sector becomes resident and dropped (children included) at unload.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub spec: BodySpec,
    /// Current world position. Diverges from `spec.position` only for
    /// drifting asteroids.
    pub position: Vec3,
    pub motion: BodyMotion,
}

impl Body {
    /// Build the live instance for a descriptor, rolling moon systems for
    /// planets and drift velocity for asteroids.
    pub fn build<R: Rng>(tuning: &TuningConfig, spec: BodySpec, rng: &mut R) -> Self {
        let motion = match spec.kind {
            BodyKind::Planet => BodyMotion::Planet {
                moons: spawn_moons(&tuning.moons, spec.radius, rng),
            },
            BodyKind::BlackHole => BodyMotion::BlackHole,
            BodyKind::Asteroid => {
                let a = &tuning.asteroids;
                BodyMotion::Asteroid {
                    // Down-river toward the ship, with slight lateral drift.
                    velocity: Vec3::new(
                        rng.gen_range(-a.drift..=a.drift),
                        0.0,
                        -rng.gen_range(a.fall_min..=a.fall_max),
                    ),
                    spin_axis: random_axis(rng),
                    spin_speed: rng.gen_range(a.spin_min..=a.spin_max),
                    spin_angle: 0.0,
                }
            }
        };

        Self {
            id: BodyId::new(),
            position: spec.position,
            spec,
            motion,
        }
    }

    /// Advance local motion by one frame.
    pub fn tick(&mut self, dt: f32) {
        match &mut self.motion {
            BodyMotion::Planet { moons } => {
                for moon in moons {
                    moon.angle += moon.speed * dt;
                    moon.spin_angle += moon.spin_speed * dt;
                }
            }
            BodyMotion::BlackHole => {}
            BodyMotion::Asteroid {
                velocity,
                spin_speed,
                spin_angle,
                ..
            } => {
                self.position += *velocity * dt;
                *spin_angle += *spin_speed * dt;
            }
        }
    }

    pub fn collision_radius(&self) -> f32 {
        self.spec.radius
    }

    /// View of this body as a gravity source, if it is one.
    pub fn to_active(&self) -> Option<ActiveBody> {
        self.spec.kind.is_mass_source().then(|| ActiveBody {
            id: self.id,
            position: self.position,
            radius: self.spec.radius,
            mass: self.spec.mass,
            kind: self.spec.kind,
        })
    }

    /// Append this body and any attached children as collision candidates.
    pub fn hazards(&self, out: &mut Vec<Hazard>) {
        out.push(Hazard {
            position: self.position,
            radius: self.spec.radius,
        });
        if let BodyMotion::Planet { moons } = &self.motion {
            for moon in moons {
                out.push(Hazard {
                    position: self.position + moon.local_offset(),
                    radius: moon.radius,
                });
            }
        }
    }
}

fn spawn_moons<R: Rng>(tuning: &MoonTuning, parent_radius: f32, rng: &mut R) -> Vec<Moon> {
    let count = rng.gen_range(tuning.min_count..=tuning.max_count);
    (0..count)
        .map(|_| {
            let direction = if rng.r#gen::<bool>() { 1.0 } else { -1.0 };
            Moon {
                radius: rng.gen_range(tuning.radius_min..=tuning.radius_max),
                orbit_radius: parent_radius
                    + rng.gen_range(tuning.orbit_gap_min..=tuning.orbit_gap_max),
                angle: rng.gen_range(0.0..=std::f32::consts::TAU),
                speed: rng.gen_range(tuning.orbit_speed_min..=tuning.orbit_speed_max) * direction,
                height: rng.gen_range(-tuning.height_jitter..=tuning.height_jitter),
                spin_axis: random_axis(rng),
                spin_speed: rng.gen_range(tuning.spin_min..=tuning.spin_max),
                spin_angle: 0.0,
            }
        })
        .collect()
}

fn random_axis<R: Rng>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
    )
    .normalize_or(Vec3::Y)
}
