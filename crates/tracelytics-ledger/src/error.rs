use tracelytics_store::StoreError;
use tracelytics_types::{Checksum, TableName};

/// Errors produced by entity operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{table} already exists ({checksum})")]
    DuplicateKey { table: TableName, checksum: Checksum },

    #[error("{table} does not exist ({checksum})")]
    NotFound { table: TableName, checksum: Checksum },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl LedgerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LedgerError::InvalidArgument(msg.into())
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey {
                table, checksum, ..
            } => LedgerError::DuplicateKey { table, checksum },
            StoreError::NotFound {
                table, checksum, ..
            } => LedgerError::NotFound { table, checksum },
            other => LedgerError::Store(other),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Store(StoreError::from(err))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
