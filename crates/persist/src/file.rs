//! File-backed sector store.
//!
//! Layout inside the store directory:
//! ```text
//! universe.meta.json        - metadata and schema version
//! manifest.json             - sha256 checksum per sector payload
//! sectors/
//!   3_-1.sector.cbor.zst    - CBOR+zstd compressed SectorData per key
//! ```
//!
//! Sectors are independent of one another, so checksums are per-file with no
//! hash chain. A payload that fails its checksum or does not decode is
//! treated as absent (the caller regenerates); only a schema mismatch on
//! open is fail-closed.

use crate::backend::{BatchId, FetchOutcome, PersistError, SectorBackend};
use gravflow_common::{SectorData, SectorKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const SECTOR_SCHEMA_VERSION: u32 = 1;

/// Metadata stored in universe.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub sector_schema_version: u32,
    pub sector_count: u32,
}

/// Directory-backed [`SectorBackend`] with schema versioning and per-file
/// integrity checking. Loads resolve immediately; results are handed over
/// on the next poll to keep the trait's submit/poll shape.
pub struct FileBackend {
    root: PathBuf,
    meta: StoreMeta,
    manifest: BTreeMap<String, String>,
    ready: Vec<(BatchId, FetchOutcome)>,
}

impl FileBackend {
    /// Open or create a sector store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("sectors"))?;

        let meta_path = root.join("universe.meta.json");
        let manifest_path = root.join("manifest.json");

        let (meta, manifest) = if meta_path.exists() {
            let meta: StoreMeta = serde_json::from_reader(std::fs::File::open(&meta_path)?)?;
            if meta.sector_schema_version != SECTOR_SCHEMA_VERSION {
                return Err(PersistError::SchemaMismatch {
                    file_version: meta.sector_schema_version,
                    expected_version: SECTOR_SCHEMA_VERSION,
                });
            }
            let manifest: BTreeMap<String, String> = if manifest_path.exists() {
                serde_json::from_reader(std::fs::File::open(&manifest_path)?)?
            } else {
                BTreeMap::new()
            };
            (meta, manifest)
        } else {
            let meta = StoreMeta {
                sector_schema_version: SECTOR_SCHEMA_VERSION,
                sector_count: 0,
            };
            let manifest = BTreeMap::new();
            serde_json::to_writer_pretty(std::fs::File::create(&meta_path)?, &meta)?;
            serde_json::to_writer_pretty(std::fs::File::create(&manifest_path)?, &manifest)?;
            (meta, manifest)
        };

        Ok(Self {
            root,
            meta,
            manifest,
            ready: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    fn sector_filename(key: SectorKey) -> String {
        format!("{}.sector.cbor.zst", key.file_stem())
    }

    fn sector_path(&self, key: SectorKey) -> PathBuf {
        self.root.join("sectors").join(Self::sector_filename(key))
    }

    /// Read one sector payload. Missing, corrupt, or undecodable payloads
    /// all come back as `None`; corruption is logged, never fatal.
    fn load_sector(&self, key: SectorKey) -> Option<SectorData> {
        let path = self.sector_path(key);
        let compressed = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };

        let filename = Self::sector_filename(key);
        if let Some(expected) = self.manifest.get(&filename) {
            let actual = sha256_hex(&compressed);
            if &actual != expected {
                tracing::warn!(%key, "sector payload failed integrity check, treating as absent");
                return None;
            }
        }

        match decode_payload(&compressed) {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::warn!(%key, %err, "sector payload undecodable, treating as absent");
                None
            }
        }
    }

    fn write_sector(&mut self, key: SectorKey, data: &SectorData) -> Result<(), PersistError> {
        let compressed = encode_payload(data)?;
        let filename = Self::sector_filename(key);
        std::fs::write(self.sector_path(key), &compressed)?;

        let is_new = self
            .manifest
            .insert(filename, sha256_hex(&compressed))
            .is_none();
        if is_new {
            self.meta.sector_count += 1;
        }
        Ok(())
    }

    fn save_meta_and_manifest(&self) -> Result<(), PersistError> {
        serde_json::to_writer_pretty(
            std::fs::File::create(self.root.join("universe.meta.json"))?,
            &self.meta,
        )?;
        serde_json::to_writer_pretty(
            std::fs::File::create(self.root.join("manifest.json"))?,
            &self.manifest,
        )?;
        Ok(())
    }
}

impl SectorBackend for FileBackend {
    fn submit_load(&mut self, batch: BatchId, keys: &[SectorKey]) {
        let found: HashMap<SectorKey, SectorData> = keys
            .iter()
            .filter_map(|k| self.load_sector(*k).map(|d| (*k, d)))
            .collect();
        tracing::debug!(batch, requested = keys.len(), found = found.len(), "sector load");
        self.ready.push((batch, FetchOutcome::Resolved(found)));
    }

    fn poll_loads(&mut self) -> Vec<(BatchId, FetchOutcome)> {
        std::mem::take(&mut self.ready)
    }

    fn save(&mut self, batch: &HashMap<SectorKey, SectorData>) -> Result<(), PersistError> {
        for (key, data) in batch {
            self.write_sector(*key, data)?;
        }
        self.save_meta_and_manifest()?;
        tracing::debug!(saved = batch.len(), total = self.meta.sector_count, "sector save");
        Ok(())
    }
}

fn encode_payload(data: &SectorData) -> Result<Vec<u8>, PersistError> {
    let mut cbor = Vec::new();
    ciborium::into_writer(data, &mut cbor).map_err(|e| PersistError::CborEncode(e.to_string()))?;

    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(&cbor)?;
    Ok(encoder.finish()?)
}

fn decode_payload(compressed: &[u8]) -> Result<SectorData, PersistError> {
    let mut decoder = zstd::Decoder::new(compressed)?;
    let mut cbor = Vec::new();
    decoder.read_to_end(&mut cbor)?;
    ciborium::from_reader(cbor.as_slice()).map_err(|e| PersistError::CborDecode(e.to_string()))
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
