use thiserror::Error;
use tracelytics_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] tracelytics_store::StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Failure category reported back to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateKey,
    NotFound,
    InvalidArgument,
    Unauthorized,
    Storage,
}

impl SdkError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SdkError::InvalidArgument(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SdkError::Unauthorized(_) => ErrorKind::Unauthorized,
            SdkError::Ledger(LedgerError::DuplicateKey { .. }) => ErrorKind::DuplicateKey,
            SdkError::Ledger(LedgerError::NotFound { .. }) => ErrorKind::NotFound,
            SdkError::Ledger(LedgerError::InvalidArgument(_)) => ErrorKind::InvalidArgument,
            SdkError::Ledger(LedgerError::Unauthorized(_)) => ErrorKind::Unauthorized,
            SdkError::Ledger(LedgerError::Store(_))
            | SdkError::Store(_)
            | SdkError::Serialization(_) => ErrorKind::Storage,
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
