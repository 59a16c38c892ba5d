//! Published table schema.
//!
//! The deployment side installs exactly these field lists, so every entry
//! must match the keys a serialized row carries.

use serde::Serialize;
use tracelytics_types::TableName;

use crate::entities::{Batch, Delivery, Machine, Product, ProductInstance, Site, User};
use crate::entity::Entity;

/// One persisted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl FieldSchema {
    pub const fn new(name: &'static str, ty: &'static str) -> Self {
        Self {
            name,
            ty,
            default: None,
        }
    }

    pub const fn with_default(name: &'static str, ty: &'static str, default: &'static str) -> Self {
        Self {
            name,
            ty,
            default: Some(default),
        }
    }
}

pub(crate) const ID: FieldSchema = FieldSchema::new("id", "uint64");
pub(crate) const DATA: FieldSchema = FieldSchema::with_default("data", "json[]", "[]");
pub(crate) const ZERO_CHECKSUM: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A table and its ordered fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: TableName,
    pub primary_key: &'static str,
    pub index: &'static str,
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    fn of<E: Entity>() -> Self {
        let index = E::FIELDS
            .iter()
            .find(|f| f.name.ends_with("_checksum"))
            .map(|f| f.name)
            .unwrap_or("id");
        Self {
            name: E::TABLE,
            primary_key: "id",
            index,
            fields: E::FIELDS.to_vec(),
        }
    }
}

/// Schema of a single table.
pub fn table_schema(table: TableName) -> TableSchema {
    match table {
        TableName::Batch => TableSchema::of::<Batch>(),
        TableName::Delivery => TableSchema::of::<Delivery>(),
        TableName::Machine => TableSchema::of::<Machine>(),
        TableName::Product => TableSchema::of::<Product>(),
        TableName::ProductInstance => TableSchema::of::<ProductInstance>(),
        TableName::Site => TableSchema::of::<Site>(),
        TableName::User => TableSchema::of::<User>(),
    }
}

/// Schema of every table, in table-name order.
pub fn schema() -> Vec<TableSchema> {
    TableName::ALL.into_iter().map(table_schema).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::*;
    use crate::entity::Entity;
    use serde_json::Value;
    use std::collections::BTreeSet;
    use tracelytics_types::{Checksum, Scope};

    fn company() -> Scope {
        Scope::new("raptor").unwrap()
    }

    fn keys_of<E: Entity>(row: &E) -> BTreeSet<String> {
        match serde_json::to_value(row).unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("row serialized to {other}"),
        }
    }

    fn schema_keys<E: Entity>() -> BTreeSet<String> {
        E::FIELDS.iter().map(|f| f.name.to_string()).collect()
    }

    fn assert_agrees<E: Entity>(row: E) {
        assert_eq!(keys_of(&row), schema_keys::<E>(), "table {}", E::TABLE);
        assert_eq!(E::FIELDS.len(), schema_keys::<E>().len(), "duplicate field");
    }

    #[test]
    fn schema_matches_serialized_rows() {
        let c = Checksum::ZERO;
        assert_agrees(Batch::create(0, c, NewBatch::new(company(), "B")).unwrap());
        assert_agrees(Delivery::create(0, c, NewDelivery::new(company(), "D")).unwrap());
        assert_agrees(Machine::create(0, c, NewMachine::new(company(), "M")).unwrap());
        assert_agrees(Product::create(0, c, NewProduct::new(company(), "P")).unwrap());
        assert_agrees(
            ProductInstance::create(0, c, NewProductInstance::new(company(), "PI")).unwrap(),
        );
        assert_agrees(Site::create(0, c, NewSite::new(company(), "S")).unwrap());
        assert_agrees(User::create(0, c, NewUser::new(company(), "U")).unwrap());
    }

    #[test]
    fn every_table_is_published() {
        let tables: Vec<TableName> = schema().iter().map(|t| t.name).collect();
        assert_eq!(tables, TableName::ALL.to_vec());
    }

    #[test]
    fn fields_start_with_id_and_end_with_data() {
        for table in schema() {
            assert_eq!(table.fields.first().map(|f| f.name), Some("id"));
            assert_eq!(table.fields.last().map(|f| f.name), Some("data"));
        }
    }

    #[test]
    fn index_is_the_checksum_field() {
        assert_eq!(table_schema(TableName::ProductInstance).index, "productins_checksum");
        assert_eq!(table_schema(TableName::User).index, "user_checksum");
    }

    #[test]
    fn machine_site_defaults_to_zero_hash() {
        let machine = table_schema(TableName::Machine);
        let site = machine.fields.iter().find(|f| f.name == "site").unwrap();
        assert_eq!(site.default, Some(ZERO_CHECKSUM));
    }

    #[test]
    fn schema_serializes_type_key() {
        let json = serde_json::to_value(table_schema(TableName::Site)).unwrap();
        assert_eq!(json["name"], "site");
        assert_eq!(json["fields"][1]["name"], "site_checksum");
        assert_eq!(json["fields"][1]["type"], "checksum256");
    }
}
