use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_crypto::checksum;
use tracelytics_types::{Checksum, Scope, TableName};

use super::assign;
use crate::entity::{impl_request, Entity};
use crate::error::LedgerResult;
use crate::schema::{FieldSchema, DATA, ID, ZERO_CHECKSUM};

/// A physical instance of a product, optionally located at a site.
///
/// `site_id` is the human-readable site label and `site_checksum` its
/// digest. An empty label pairs with the zero checksum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInstance {
    pub id: u64,
    pub productins_checksum: Checksum,
    pub productins_id: String,
    pub site_checksum: Checksum,
    pub site_id: String,
    pub product: String,
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProductInstance {
    pub company: Scope,
    pub productins_id: String,
    pub product: Option<String>,
    pub site_id: Option<String>,
}

impl NewProductInstance {
    pub fn new(company: Scope, productins_id: impl Into<String>) -> Self {
        Self {
            company,
            productins_id: productins_id.into(),
            product: None,
            site_id: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditProductInstance {
    pub company: Scope,
    pub productins_id: String,
    pub product: Option<String>,
    pub site_id: Option<String>,
}

impl EditProductInstance {
    pub fn new(company: Scope, productins_id: impl Into<String>) -> Self {
        Self {
            company,
            productins_id: productins_id.into(),
            product: None,
            site_id: None,
        }
    }
}

impl_request!(NewProductInstance, productins_id);
impl_request!(EditProductInstance, productins_id);

impl ProductInstance {
    fn place(&mut self, site_id: String) {
        self.site_checksum = if site_id.is_empty() {
            Checksum::ZERO
        } else {
            checksum(&site_id)
        };
        self.site_id = site_id;
    }
}

impl Entity for ProductInstance {
    const TABLE: TableName = TableName::ProductInstance;
    const FIELDS: &'static [FieldSchema] = &[
        ID,
        FieldSchema::new("productins_checksum", "checksum256"),
        FieldSchema::new("productins_id", "string"),
        FieldSchema::with_default("site_checksum", "checksum256", ZERO_CHECKSUM),
        FieldSchema::with_default("site_id", "string", ""),
        FieldSchema::with_default("product", "string", ""),
        DATA,
    ];

    type Create = NewProductInstance;
    type Edit = EditProductInstance;

    fn create(id: u64, checksum: Checksum, request: NewProductInstance) -> LedgerResult<Self> {
        let mut row = Self {
            id,
            productins_checksum: checksum,
            productins_id: request.productins_id,
            site_checksum: Checksum::ZERO,
            site_id: String::new(),
            product: request.product.unwrap_or_default(),
            data: Vec::new(),
        };
        if let Some(site_id) = request.site_id {
            row.place(site_id);
        }
        Ok(row)
    }

    fn edit(&mut self, request: EditProductInstance) -> LedgerResult<()> {
        assign(&mut self.product, request.product);
        if let Some(site_id) = request.site_id {
            self.place(site_id);
        }
        Ok(())
    }

    fn primary_key(&self) -> u64 {
        self.id
    }

    fn checksum(&self) -> Checksum {
        self.productins_checksum
    }

    fn natural_id(&self) -> &str {
        &self.productins_id
    }
}
