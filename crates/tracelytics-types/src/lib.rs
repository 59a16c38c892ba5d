//! Foundation types for the Tracelytics record store.
//!
//! Every other Tracelytics crate depends on `tracelytics-types`.
//!
//! # Key Types
//!
//! - [`Checksum`]: 32-byte sha256 digest used as the secondary index of every table
//! - [`Scope`]: tenant partition ("company") isolating all rows of all tables
//! - [`TableName`]: the entity tables known to the store

pub mod checksum;
pub mod error;
pub mod scope;
pub mod table;

pub use checksum::Checksum;
pub use error::TypeError;
pub use scope::Scope;
pub use table::TableName;
