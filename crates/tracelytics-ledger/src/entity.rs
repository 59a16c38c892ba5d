use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracelytics_types::{Checksum, Scope, TableName};

use crate::error::LedgerResult;
use crate::schema::FieldSchema;

/// A row type stored in one of the Tracelytics tables.
///
/// Each entity knows its table, how to build a fresh row from a create
/// request, and how to apply a partial edit. The service computes the
/// checksum and primary key; `create` only fills in fields and defaults.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    const TABLE: TableName;

    /// Persisted fields, in declaration order.
    const FIELDS: &'static [FieldSchema];

    type Create: Request;
    type Edit: Request;

    fn create(id: u64, checksum: Checksum, request: Self::Create) -> LedgerResult<Self>;

    /// Apply an edit. Fields the request leaves `None` keep their value.
    fn edit(&mut self, request: Self::Edit) -> LedgerResult<()>;

    fn primary_key(&self) -> u64;

    fn checksum(&self) -> Checksum;

    fn natural_id(&self) -> &str;
}

/// Anything addressed at a single row: a tenant plus a natural id.
pub trait Request {
    fn company(&self) -> &Scope;
    fn natural_id(&self) -> &str;
}

/// Delete request, shared by every table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub company: Scope,
    pub id: String,
}

impl DeleteRequest {
    pub fn new(company: Scope, id: impl Into<String>) -> Self {
        Self {
            company,
            id: id.into(),
        }
    }
}

impl Request for DeleteRequest {
    fn company(&self) -> &Scope {
        &self.company
    }

    fn natural_id(&self) -> &str {
        &self.id
    }
}

/// Implements [`Request`] for a struct with a `company` field and the named
/// natural-id field.
macro_rules! impl_request {
    ($ty:ty, $id:ident) => {
        impl $crate::entity::Request for $ty {
            fn company(&self) -> &tracelytics_types::Scope {
                &self.company
            }

            fn natural_id(&self) -> &str {
                &self.$id
            }
        }
    };
}

pub(crate) use impl_request;
