use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_types::{Checksum, Scope, TableName};

use super::assign;
use crate::cargo::{CargoDelta, CargoEntry, CargoLedger};
use crate::entity::{impl_request, Entity};
use crate::error::LedgerResult;
use crate::schema::{FieldSchema, DATA, ID};

/// A shipment between parties, carrying a cargo sub-ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: u64,
    pub delivery_checksum: Checksum,
    pub delivery_id: String,
    pub shipper_id: String,
    pub driver_id: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub cargo: CargoLedger,
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDelivery {
    pub company: Scope,
    pub delivery_id: String,
    pub shipper_id: Option<String>,
    pub driver_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    /// Initial cargo, stored verbatim.
    pub cargo: Vec<CargoEntry>,
}

impl NewDelivery {
    pub fn new(company: Scope, delivery_id: impl Into<String>) -> Self {
        Self {
            company,
            delivery_id: delivery_id.into(),
            shipper_id: None,
            driver_id: None,
            start_time: None,
            end_time: None,
            status: None,
            cargo: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditDelivery {
    pub company: Scope,
    pub delivery_id: String,
    pub shipper_id: Option<String>,
    pub driver_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    /// Applied through [`CargoLedger::apply_deltas`].
    pub cargo: Vec<CargoDelta>,
}

impl EditDelivery {
    pub fn new(company: Scope, delivery_id: impl Into<String>) -> Self {
        Self {
            company,
            delivery_id: delivery_id.into(),
            shipper_id: None,
            driver_id: None,
            start_time: None,
            end_time: None,
            status: None,
            cargo: Vec::new(),
        }
    }
}

impl_request!(NewDelivery, delivery_id);
impl_request!(EditDelivery, delivery_id);

impl Entity for Delivery {
    const TABLE: TableName = TableName::Delivery;
    const FIELDS: &'static [FieldSchema] = &[
        ID,
        FieldSchema::new("delivery_checksum", "checksum256"),
        FieldSchema::new("delivery_id", "string"),
        FieldSchema::with_default("shipper_id", "string", ""),
        FieldSchema::with_default("driver_id", "string", ""),
        FieldSchema::with_default("start_time", "string", ""),
        FieldSchema::with_default("end_time", "string", ""),
        FieldSchema::with_default("status", "string", ""),
        FieldSchema::with_default("cargo", "cargo[]", "[]"),
        DATA,
    ];

    type Create = NewDelivery;
    type Edit = EditDelivery;

    fn create(id: u64, checksum: Checksum, request: NewDelivery) -> LedgerResult<Self> {
        Ok(Self {
            id,
            delivery_checksum: checksum,
            delivery_id: request.delivery_id,
            shipper_id: request.shipper_id.unwrap_or_default(),
            driver_id: request.driver_id.unwrap_or_default(),
            start_time: request.start_time.unwrap_or_default(),
            end_time: request.end_time.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            cargo: CargoLedger::from_entries(request.cargo)?,
            data: Vec::new(),
        })
    }

    /// Cargo deltas go first; if they are rejected no field changes either.
    fn edit(&mut self, request: EditDelivery) -> LedgerResult<()> {
        self.cargo.apply_deltas(&request.cargo)?;
        assign(&mut self.shipper_id, request.shipper_id);
        assign(&mut self.driver_id, request.driver_id);
        assign(&mut self.start_time, request.start_time);
        assign(&mut self.end_time, request.end_time);
        assign(&mut self.status, request.status);
        Ok(())
    }

    fn primary_key(&self) -> u64 {
        self.id
    }

    fn checksum(&self) -> Checksum {
        self.delivery_checksum
    }

    fn natural_id(&self) -> &str {
        &self.delivery_id
    }
}
