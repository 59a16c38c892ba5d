use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_types::{Checksum, Scope, TableName};

use super::assign;
use crate::entity::{impl_request, Entity};
use crate::error::LedgerResult;
use crate::schema::{FieldSchema, DATA, ID};

/// A production batch run by a user on a machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: u64,
    pub batch_checksum: Checksum,
    pub batch_id: String,
    pub user_id: String,
    pub machine_id: String,
    pub date: String,
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBatch {
    pub company: Scope,
    pub batch_id: String,
    pub user_id: Option<String>,
    pub machine_id: Option<String>,
    pub date: Option<String>,
}

impl NewBatch {
    pub fn new(company: Scope, batch_id: impl Into<String>) -> Self {
        Self {
            company,
            batch_id: batch_id.into(),
            user_id: None,
            machine_id: None,
            date: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditBatch {
    pub company: Scope,
    pub batch_id: String,
    pub user_id: Option<String>,
    pub machine_id: Option<String>,
    pub date: Option<String>,
}

impl EditBatch {
    pub fn new(company: Scope, batch_id: impl Into<String>) -> Self {
        Self {
            company,
            batch_id: batch_id.into(),
            user_id: None,
            machine_id: None,
            date: None,
        }
    }
}

impl_request!(NewBatch, batch_id);
impl_request!(EditBatch, batch_id);

impl Entity for Batch {
    const TABLE: TableName = TableName::Batch;
    const FIELDS: &'static [FieldSchema] = &[
        ID,
        FieldSchema::new("batch_checksum", "checksum256"),
        FieldSchema::new("batch_id", "string"),
        FieldSchema::with_default("user_id", "string", ""),
        FieldSchema::with_default("machine_id", "string", ""),
        FieldSchema::with_default("date", "string", ""),
        DATA,
    ];

    type Create = NewBatch;
    type Edit = EditBatch;

    fn create(id: u64, checksum: Checksum, request: NewBatch) -> LedgerResult<Self> {
        Ok(Self {
            id,
            batch_checksum: checksum,
            batch_id: request.batch_id,
            user_id: request.user_id.unwrap_or_default(),
            machine_id: request.machine_id.unwrap_or_default(),
            date: request.date.unwrap_or_default(),
            data: Vec::new(),
        })
    }

    fn edit(&mut self, request: EditBatch) -> LedgerResult<()> {
        assign(&mut self.user_id, request.user_id);
        assign(&mut self.machine_id, request.machine_id);
        assign(&mut self.date, request.date);
        Ok(())
    }

    fn primary_key(&self) -> u64 {
        self.id
    }

    fn checksum(&self) -> Checksum {
        self.batch_checksum
    }

    fn natural_id(&self) -> &str {
        &self.batch_id
    }
}
