use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracelytics_types::{Scope, TableName};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryTableStore;
use crate::row::StoredRow;

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Point-in-time copy of a whole store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub partitions: Vec<PartitionSnapshot>,
}

/// One (scope, table) partition inside a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    pub scope: Scope,
    pub table: TableName,
    pub next_primary_key: u64,
    pub rows: Vec<StoredRow>,
}

impl StoreSnapshot {
    pub fn new(partitions: Vec<PartitionSnapshot>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            partitions,
        }
    }

    pub fn check_version(&self) -> StoreResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedSnapshot {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl InMemoryTableStore {
    /// Write the store to `path` as pretty-printed JSON.
    ///
    /// The document is written to a uniquely named temp file in the same
    /// directory, synced, and then renamed over `path`.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let snapshot = self.snapshot()?;
        let json = snapshot.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        info!(path = %path.display(), partitions = snapshot.partitions.len(), "snapshot saved");
        Ok(())
    }

    /// Load a store from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)?;
        let snapshot = StoreSnapshot::from_json(&json)?;
        let partitions = snapshot.partitions.len();
        let store = Self::from_snapshot(snapshot)?;
        info!(path = %path.display(), partitions, "snapshot loaded");
        Ok(store)
    }
}
