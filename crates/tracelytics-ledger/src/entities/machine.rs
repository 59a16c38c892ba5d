use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_types::{Checksum, Scope, TableName};

use super::assign;
use crate::entity::{impl_request, Entity};
use crate::error::LedgerResult;
use crate::schema::{FieldSchema, DATA, ID, ZERO_CHECKSUM};

/// A machine, optionally placed at a site.
///
/// `site` is the checksum of the site's id; the zero checksum means the
/// machine is not assigned anywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: u64,
    pub machine_checksum: Checksum,
    pub machine_id: String,
    pub name: String,
    pub site: Checksum,
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMachine {
    pub company: Scope,
    pub machine_id: String,
    pub name: Option<String>,
    pub site: Option<Checksum>,
}

impl NewMachine {
    pub fn new(company: Scope, machine_id: impl Into<String>) -> Self {
        Self {
            company,
            machine_id: machine_id.into(),
            name: None,
            site: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditMachine {
    pub company: Scope,
    pub machine_id: String,
    pub name: Option<String>,
    pub site: Option<Checksum>,
}

impl EditMachine {
    pub fn new(company: Scope, machine_id: impl Into<String>) -> Self {
        Self {
            company,
            machine_id: machine_id.into(),
            name: None,
            site: None,
        }
    }
}

impl_request!(NewMachine, machine_id);
impl_request!(EditMachine, machine_id);

impl Entity for Machine {
    const TABLE: TableName = TableName::Machine;
    const FIELDS: &'static [FieldSchema] = &[
        ID,
        FieldSchema::new("machine_checksum", "checksum256"),
        FieldSchema::new("machine_id", "string"),
        FieldSchema::with_default("name", "string", ""),
        FieldSchema::with_default("site", "checksum256", ZERO_CHECKSUM),
        DATA,
    ];

    type Create = NewMachine;
    type Edit = EditMachine;

    fn create(id: u64, checksum: Checksum, request: NewMachine) -> LedgerResult<Self> {
        Ok(Self {
            id,
            machine_checksum: checksum,
            machine_id: request.machine_id,
            name: request.name.unwrap_or_default(),
            site: request.site.unwrap_or(Checksum::ZERO),
            data: Vec::new(),
        })
    }

    fn edit(&mut self, request: EditMachine) -> LedgerResult<()> {
        assign(&mut self.name, request.name);
        assign(&mut self.site, request.site);
        Ok(())
    }

    fn primary_key(&self) -> u64 {
        self.id
    }

    fn checksum(&self) -> Checksum {
        self.machine_checksum
    }

    fn natural_id(&self) -> &str {
        &self.machine_id
    }
}
