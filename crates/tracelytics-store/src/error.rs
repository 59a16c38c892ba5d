use tracelytics_types::{Checksum, Scope, TableName};

/// Errors from table store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row with this checksum already exists in the partition.
    #[error("{table} {checksum} already exists in scope {scope}")]
    DuplicateKey {
        scope: Scope,
        table: TableName,
        checksum: Checksum,
    },

    /// No row with this checksum exists in the partition.
    #[error("{table} {checksum} does not exist in scope {scope}")]
    NotFound {
        scope: Scope,
        table: TableName,
        checksum: Checksum,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    LockPoisoned,

    /// A snapshot document was written by an incompatible version.
    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedSnapshot { found: u32, expected: u32 },

    /// A snapshot document contradicts the store's invariants.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
