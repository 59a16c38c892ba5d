//! Scoped table storage for the Tracelytics record store.
//!
//! Rows live in tables partitioned by tenant [`Scope`](tracelytics_types::Scope).
//! Each row carries an auto-incrementing primary key and is indexed by the
//! [`Checksum`](tracelytics_types::Checksum) of its natural identifier.
//!
//! # Storage Backends
//!
//! All backends implement the [`TableStore`] trait:
//!
//! - [`InMemoryTableStore`] -- `BTreeMap`-per-partition store for tests and embedding
//!
//! [`StoreSnapshot`] captures an in-memory store as a JSON document so that it
//! can be persisted between process runs.
//!
//! # Design Rules
//!
//! 1. A checksum appears at most once per (scope, table).
//! 2. Primary keys are monotonic per (scope, table) and never reused.
//! 3. Every read-modify-write cycle holds the partition lock for its duration.
//! 4. Failed mutations leave the partition untouched.
//! 5. The store never interprets row contents beyond its own bookkeeping.

pub mod error;
pub mod memory;
pub mod row;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryTableStore;
pub use row::StoredRow;
pub use snapshot::{PartitionSnapshot, StoreSnapshot};
pub use traits::TableStore;
