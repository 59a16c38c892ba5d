use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_types::{Checksum, Scope, TableName};

use super::assign;
use crate::entity::{impl_request, Entity};
use crate::error::LedgerResult;
use crate::schema::{FieldSchema, DATA, ID};

/// A product definition. Instances of it live in the `productins` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub product_checksum: Checksum,
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub company: Scope,
    pub product_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl NewProduct {
    pub fn new(company: Scope, product_id: impl Into<String>) -> Self {
        Self {
            company,
            product_id: product_id.into(),
            name: None,
            description: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditProduct {
    pub company: Scope,
    pub product_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl EditProduct {
    pub fn new(company: Scope, product_id: impl Into<String>) -> Self {
        Self {
            company,
            product_id: product_id.into(),
            name: None,
            description: None,
        }
    }
}

impl_request!(NewProduct, product_id);
impl_request!(EditProduct, product_id);

impl Entity for Product {
    const TABLE: TableName = TableName::Product;
    const FIELDS: &'static [FieldSchema] = &[
        ID,
        FieldSchema::new("product_checksum", "checksum256"),
        FieldSchema::new("product_id", "string"),
        FieldSchema::with_default("name", "string", ""),
        FieldSchema::with_default("description", "string", ""),
        DATA,
    ];

    type Create = NewProduct;
    type Edit = EditProduct;

    fn create(id: u64, checksum: Checksum, request: NewProduct) -> LedgerResult<Self> {
        Ok(Self {
            id,
            product_checksum: checksum,
            product_id: request.product_id,
            name: request.name.unwrap_or_default(),
            description: request.description.unwrap_or_default(),
            data: Vec::new(),
        })
    }

    fn edit(&mut self, request: EditProduct) -> LedgerResult<()> {
        assign(&mut self.name, request.name);
        assign(&mut self.description, request.description);
        Ok(())
    }

    fn primary_key(&self) -> u64 {
        self.id
    }

    fn checksum(&self) -> Checksum {
        self.product_checksum
    }

    fn natural_id(&self) -> &str {
        &self.product_id
    }
}
