use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The entity tables held by the store.
///
/// The serialized names are the on-ledger table names and are what query
/// callers pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Batch,
    Delivery,
    Machine,
    Product,
    #[serde(rename = "productins")]
    ProductInstance,
    Site,
    User,
}

impl TableName {
    /// Every table, in name order.
    pub const ALL: [TableName; 7] = [
        TableName::Batch,
        TableName::Delivery,
        TableName::Machine,
        TableName::Product,
        TableName::ProductInstance,
        TableName::Site,
        TableName::User,
    ];

    /// The persisted table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Batch => "batch",
            TableName::Delivery => "delivery",
            TableName::Machine => "machine",
            TableName::Product => "product",
            TableName::ProductInstance => "productins",
            TableName::Site => "site",
            TableName::User => "user",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| TypeError::UnknownTable(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for table in TableName::ALL {
            assert_eq!(table.as_str().parse::<TableName>().unwrap(), table);
        }
    }

    #[test]
    fn product_instance_uses_short_name() {
        assert_eq!(TableName::ProductInstance.to_string(), "productins");
        let json = serde_json::to_string(&TableName::ProductInstance).unwrap();
        assert_eq!(json, "\"productins\"");
    }

    #[test]
    fn unknown_table_is_rejected() {
        assert_eq!(
            "recipe".parse::<TableName>().unwrap_err(),
            TypeError::UnknownTable("recipe".into())
        );
    }
}
