//! Entity layer of the Tracelytics record store.
//!
//! This crate turns the generic [`TableStore`](tracelytics_store::TableStore)
//! into the seven supply-chain tables. It provides:
//! - Row types for sites, machines, products, product instances, batches,
//!   deliveries and users, each keyed by `sha256(natural_id)`
//! - Typed create/edit/delete requests with explicit defaults
//! - The per-delivery cargo sub-ledger with additive delta semantics
//! - Capability-string parsing for user permissions
//! - A published schema matching the serialized rows
//! - The [`Tracelytics`] service tying it all to a store backend

pub mod cargo;
pub mod entities;
pub mod entity;
pub mod error;
pub mod permissions;
pub mod schema;
pub mod service;

pub use cargo::{Cargo, CargoDelta, CargoEntry, CargoLedger};
pub use entities::{
    Batch, Delivery, EditBatch, EditDelivery, EditMachine, EditProduct, EditProductInstance,
    EditSite, EditUser, Machine, NewBatch, NewDelivery, NewMachine, NewProduct,
    NewProductInstance, NewSite, NewUser, Product, ProductInstance, Site, User,
};
pub use entity::{DeleteRequest, Entity, Request};
pub use error::{LedgerError, LedgerResult};
pub use schema::{schema, FieldSchema, TableSchema};
pub use service::Tracelytics;
