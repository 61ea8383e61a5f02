//! Sector persistence.
//!
//! # Invariants
//! - A load response maps keys to stored data; keys absent from the response
//!   are not-yet-generated, never an error.
//! - Saves are fire-and-forget from the caller's point of view: failures are
//!   logged upstream and never retried.
//! - Corrupt or undecodable payloads degrade to "absent"; only schema
//!   mismatch on open is fail-closed.

mod backend;
mod file;

pub use backend::{BatchId, FetchOutcome, MemoryBackend, PersistError, SectorBackend};
pub use file::{FileBackend, StoreMeta};

pub fn crate_info() -> &'static str {
    "gravflow-persist v0.1.0"
}
