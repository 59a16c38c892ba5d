use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_types::{Checksum, Scope, TableName};

use super::assign;
use crate::entity::{impl_request, Entity};
use crate::error::LedgerResult;
use crate::schema::{FieldSchema, DATA, ID};

/// A company site (plant, warehouse, yard).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: u64,
    pub site_checksum: Checksum,
    pub site_id: String,
    pub name: String,
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSite {
    pub company: Scope,
    pub site_id: String,
    pub name: Option<String>,
}

impl NewSite {
    pub fn new(company: Scope, site_id: impl Into<String>) -> Self {
        Self {
            company,
            site_id: site_id.into(),
            name: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSite {
    pub company: Scope,
    pub site_id: String,
    pub name: Option<String>,
}

impl EditSite {
    pub fn new(company: Scope, site_id: impl Into<String>) -> Self {
        Self {
            company,
            site_id: site_id.into(),
            name: None,
        }
    }
}

impl_request!(NewSite, site_id);
impl_request!(EditSite, site_id);

impl Entity for Site {
    const TABLE: TableName = TableName::Site;
    const FIELDS: &'static [FieldSchema] = &[
        ID,
        FieldSchema::new("site_checksum", "checksum256"),
        FieldSchema::new("site_id", "string"),
        FieldSchema::with_default("name", "string", ""),
        DATA,
    ];

    type Create = NewSite;
    type Edit = EditSite;

    fn create(id: u64, checksum: Checksum, request: NewSite) -> LedgerResult<Self> {
        Ok(Self {
            id,
            site_checksum: checksum,
            site_id: request.site_id,
            name: request.name.unwrap_or_default(),
            data: Vec::new(),
        })
    }

    fn edit(&mut self, request: EditSite) -> LedgerResult<()> {
        assign(&mut self.name, request.name);
        Ok(())
    }

    fn primary_key(&self) -> u64 {
        self.id
    }

    fn checksum(&self) -> Checksum {
        self.site_checksum
    }

    fn natural_id(&self) -> &str {
        &self.site_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_empty() {
        let request = NewSite::new(Scope::new("raptor").unwrap(), "SITE-1");
        let site = Site::create(0, Checksum::ZERO, request).unwrap();
        assert_eq!(site.name, "");
        assert!(site.data.is_empty());
    }

    #[test]
    fn edit_without_name_keeps_it() {
        let company = Scope::new("raptor").unwrap();
        let mut request = NewSite::new(company.clone(), "SITE-1");
        request.name = Some("Factory".into());
        let mut site = Site::create(0, Checksum::ZERO, request).unwrap();
        site.edit(EditSite::new(company, "SITE-1")).unwrap();
        assert_eq!(site.name, "Factory");
    }
}
