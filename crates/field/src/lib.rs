//! Gravity field evaluation.
//!
//! # Invariants
//! - Every function here is a pure function of its inputs; no internal state.
//! - The well and flow formulas must stay numerically identical to the
//!   renderer's vertex/fragment shader, or the ship visibly detaches from
//!   the deformed grid.
//! - At most [`MAX_ACTIVE_SOURCES`] sources influence rendering and gameplay.

mod active;
mod field;
mod noise;

pub use active::{ActiveBody, ActiveField, GravityUniforms, FAR_SENTINEL, MAX_ACTIVE_SOURCES};
pub use field::{flow_vector, surface_height, well};
pub use noise::{fbm, value_noise};

pub fn crate_info() -> &'static str {
    "gravflow-field v0.1.0"
}
