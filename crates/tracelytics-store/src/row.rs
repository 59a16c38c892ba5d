use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_types::Checksum;

/// A row as held by the store.
///
/// `data` is the serialized entity. The store owns `primary_key` and
/// `checksum`; mutators may change `data` only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub primary_key: u64,
    pub checksum: Checksum,
    pub data: Value,
}

impl StoredRow {
    pub fn new(primary_key: u64, checksum: Checksum, data: Value) -> Self {
        Self {
            primary_key,
            checksum,
            data,
        }
    }
}
