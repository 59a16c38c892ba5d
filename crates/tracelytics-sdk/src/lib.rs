//! High-level SDK for the Tracelytics record store.
//!
//! This is the boundary the transport side talks to:
//! - [`Action`] parses named actions (`newbatch`, `editdelivery`, `push`, ...)
//!   with their `{key, value: [type, value]}` argument lists
//! - [`Contract`] dispatches actions to typed entity operations, runs the
//!   `push` authorization gate, and answers table queries
//! - [`schema`](Contract::schema) publishes the persisted table layout

pub mod action;
pub mod auth;
pub mod contract;
pub mod error;
pub mod requests;

pub use action::{Action, ActionData, ActionName, Arg, ArgList, ArgValue, Verb};
pub use auth::PushRequest;
pub use contract::{Contract, QueryConfig, TableQuery};
pub use error::{ErrorKind, SdkError, SdkResult};

// Re-export key types
pub use tracelytics_ledger::{schema, LedgerError, TableSchema, Tracelytics};
pub use tracelytics_store::{InMemoryTableStore, TableStore};
pub use tracelytics_types::{Checksum, Scope, TableName};
