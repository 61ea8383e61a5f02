use gravflow_common::{SectorData, SectorKey};
use std::collections::HashMap;

/// Identifies one submitted load batch across the submit/poll boundary.
pub type BatchId = u64;

/// Errors from persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema version mismatch: store has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Resolution of one load batch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Keys present in the map were found in storage; keys from the batch
    /// that are absent have never been generated.
    Resolved(HashMap<SectorKey, SectorData>),
    /// The whole batch failed; the caller degrades to local generation.
    Failed(PersistError),
}

/// The outbound persistence contract of the world streamer.
///
/// Loads follow a submit/poll model so the frame loop never blocks: a batch
/// submitted this frame may resolve on any later poll. Everything runs on
/// the one logical game thread; an implementation doing true parallel I/O
/// must resolve into its own queue and hand results over in `poll_loads`.
pub trait SectorBackend {
    /// Issue a load request for a batch of keys.
    fn submit_load(&mut self, batch: BatchId, keys: &[SectorKey]);

    /// Drain every batch that has resolved since the last poll.
    fn poll_loads(&mut self) -> Vec<(BatchId, FetchOutcome)>;

    /// Write newly generated sectors. Synchronous and fire-and-forget;
    /// the caller logs failures and moves on.
    fn save(&mut self, batch: &HashMap<SectorKey, SectorData>) -> Result<(), PersistError>;
}

impl<T: SectorBackend + ?Sized> SectorBackend for Box<T> {
    fn submit_load(&mut self, batch: BatchId, keys: &[SectorKey]) {
        (**self).submit_load(batch, keys);
    }

    fn poll_loads(&mut self) -> Vec<(BatchId, FetchOutcome)> {
        (**self).poll_loads()
    }

    fn save(&mut self, batch: &HashMap<SectorKey, SectorData>) -> Result<(), PersistError> {
        (**self).save(batch)
    }
}

struct PendingBatch {
    id: BatchId,
    keys: Vec<SectorKey>,
    polls_remaining: u32,
}

/// In-memory backend with configurable resolve latency and one-shot failure
/// injection. The default for headless runs and the workhorse of the
/// streaming tests.
#[derive(Default)]
pub struct MemoryBackend {
    sectors: HashMap<SectorKey, SectorData>,
    latency: u32,
    queue: Vec<PendingBatch>,
    fail_next_load: bool,
    fail_saves: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches resolve only after this many polls, emulating storage
    /// round-trip latency in whole frames.
    pub fn with_latency(polls: u32) -> Self {
        Self {
            latency: polls,
            ..Self::default()
        }
    }

    /// Seed a stored sector, as if a previous session had saved it.
    pub fn insert(&mut self, key: SectorKey, data: SectorData) {
        self.sectors.insert(key, data);
    }

    pub fn contains(&self, key: &SectorKey) -> bool {
        self.sectors.contains_key(key)
    }

    pub fn stored_count(&self) -> usize {
        self.sectors.len()
    }

    /// Fail the next batch that resolves, then recover.
    pub fn fail_next_load(&mut self) {
        self.fail_next_load = true;
    }

    /// Reject every save until cleared.
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }
}

impl SectorBackend for MemoryBackend {
    fn submit_load(&mut self, batch: BatchId, keys: &[SectorKey]) {
        self.queue.push(PendingBatch {
            id: batch,
            keys: keys.to_vec(),
            polls_remaining: self.latency,
        });
    }

    fn poll_loads(&mut self) -> Vec<(BatchId, FetchOutcome)> {
        let mut resolved = Vec::new();
        let mut still_pending = Vec::new();

        for mut pending in self.queue.drain(..) {
            if pending.polls_remaining > 0 {
                pending.polls_remaining -= 1;
                still_pending.push(pending);
                continue;
            }

            if self.fail_next_load {
                self.fail_next_load = false;
                resolved.push((
                    pending.id,
                    FetchOutcome::Failed(PersistError::Unavailable("injected failure".into())),
                ));
                continue;
            }

            let found: HashMap<SectorKey, SectorData> = pending
                .keys
                .iter()
                .filter_map(|k| self.sectors.get(k).map(|d| (*k, d.clone())))
                .collect();
            resolved.push((pending.id, FetchOutcome::Resolved(found)));
        }

        self.queue = still_pending;
        resolved
    }

    fn save(&mut self, batch: &HashMap<SectorKey, SectorData>) -> Result<(), PersistError> {
        if self.fail_saves {
            return Err(PersistError::Unavailable("saves disabled".into()));
        }
        for (key, data) in batch {
            self.sectors.insert(*key, data.clone());
        }
        Ok(())
    }
}
