//! Infinite-world sector streaming.
//!
//! # Invariants
//! - A sector key maps to exactly one `SectorData` for the process lifetime;
//!   content is memoized, never regenerated while cached.
//! - The load/unload pass runs only on sector-boundary crossings, and the
//!   unload pass runs before fetch issuance so memory never waits on latency.
//! - A key is in-flight only between request issuance and resolution; every
//!   resolution path (found, missing, failed) clears the marker.
//! - Unloading a sector drops every live body and its attached moon system.

mod bodies;
mod generator;
mod store;
mod streamer;

pub use bodies::{Body, BodyMotion, Hazard, Moon};
pub use generator::generate_sector;
pub use store::SectorStore;
pub use streamer::{StreamStats, WorldStreamer};

pub fn crate_info() -> &'static str {
    "gravflow-stream v0.1.0"
}
