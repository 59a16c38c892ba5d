//! Named actions and their typed argument lists.
//!
//! An action arrives as `{"name": "newbatch", "data": {...}}`. For the
//! `new`/`edit`/`del` family the data holds an argument list of
//! `{"key": k, "value": [type, value]}` entries plus an optional `cargo`
//! list; `push` carries a [`PushRequest`](crate::auth::PushRequest).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_crypto::VerifyingKey;
use tracelytics_types::{Checksum, Scope, TableName};

use crate::error::{SdkError, SdkResult};

/// A raw action as submitted by the transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

impl Action {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Payload of a `new`/`edit`/`del` action.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    pub args: ArgList,
    /// `newdelivery`: pre-hashed cargo entries. `editdelivery`: cargo deltas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<Value>,
}

impl ActionData {
    pub fn parse(data: &Value) -> SdkResult<Self> {
        serde_json::from_value(data.clone())
            .map_err(|e| SdkError::invalid(format!("malformed action data: {e}")))
    }

    /// Decode the cargo payload, treating an absent one as empty.
    pub fn cargo<T: serde::de::DeserializeOwned>(&self) -> SdkResult<Vec<T>> {
        match &self.cargo {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| SdkError::invalid(format!("malformed cargo: {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Action names
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    New,
    Edit,
    Del,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::New => "new",
            Verb::Edit => "edit",
            Verb::Del => "del",
        }
    }

    /// Map a `push` action (`create`, `patch`, `remove`) to its verb.
    pub fn from_push(action: &str) -> Option<Self> {
        match action {
            "create" => Some(Verb::New),
            "patch" => Some(Verb::Edit),
            "remove" => Some(Verb::Del),
            _ => None,
        }
    }
}

/// A parsed `<verb><entity>` action name such as `editprodins`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionName {
    pub verb: Verb,
    pub table: TableName,
}

impl ActionName {
    pub fn new(verb: Verb, table: TableName) -> Self {
        Self { verb, table }
    }
}

/// Entity name used in action names and permissions.
pub fn entity_name(table: TableName) -> &'static str {
    match table {
        TableName::ProductInstance => "prodins",
        other => other.as_str(),
    }
}

pub fn table_for_entity(entity: &str) -> Option<TableName> {
    TableName::ALL
        .into_iter()
        .find(|table| entity_name(*table) == entity)
}

/// Argument key holding a table's natural id.
pub fn id_key(table: TableName) -> &'static str {
    match table {
        TableName::Batch => "batchId",
        TableName::Delivery => "deliveryId",
        TableName::Machine => "machineId",
        TableName::Product => "productId",
        TableName::ProductInstance => "productinsId",
        TableName::Site => "siteId",
        TableName::User => "userId",
    }
}

impl FromStr for ActionName {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || SdkError::invalid(format!("unknown action: {s}"));
        let (verb, entity) = [Verb::New, Verb::Edit, Verb::Del]
            .into_iter()
            .find_map(|verb| s.strip_prefix(verb.as_str()).map(|rest| (verb, rest)))
            .ok_or_else(unknown)?;
        let table = table_for_entity(entity).ok_or_else(unknown)?;
        Ok(Self { verb, table })
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.verb.as_str(), entity_name(self.table))
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// A typed argument value, serialized as `[type, value]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(String, Value)", into = "(String, Value)")]
pub enum ArgValue {
    Name(Scope),
    String(String),
    Checksum256(Checksum),
    PublicKey(VerifyingKey),
    Int64(i64),
    Uint64(u64),
    Bool(bool),
}

impl ArgValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Name(_) => "name",
            ArgValue::String(_) => "string",
            ArgValue::Checksum256(_) => "checksum256",
            ArgValue::PublicKey(_) => "public_key",
            ArgValue::Int64(_) => "int64",
            ArgValue::Uint64(_) => "uint64",
            ArgValue::Bool(_) => "bool",
        }
    }
}

fn expect_str(ty: &str, value: &Value) -> Result<String, SdkError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SdkError::invalid(format!("{ty} value must be a string, got {value}")))
}

impl TryFrom<(String, Value)> for ArgValue {
    type Error = SdkError;

    fn try_from((ty, value): (String, Value)) -> Result<Self, Self::Error> {
        let bad = |e: &dyn fmt::Display| SdkError::invalid(format!("invalid {ty} value: {e}"));
        match ty.as_str() {
            "name" => Scope::new(expect_str(&ty, &value)?)
                .map(ArgValue::Name)
                .map_err(|e| bad(&e)),
            "string" => expect_str(&ty, &value).map(ArgValue::String),
            "checksum256" => Checksum::from_hex(&expect_str(&ty, &value)?)
                .map(ArgValue::Checksum256)
                .map_err(|e| bad(&e)),
            "public_key" => VerifyingKey::from_hex(&expect_str(&ty, &value)?)
                .map(ArgValue::PublicKey)
                .map_err(|e| bad(&e)),
            "int64" => {
                let n = match &value {
                    Value::Number(n) => n.as_i64().ok_or_else(|| bad(n))?,
                    Value::String(s) => s.parse::<i64>().map_err(|e| bad(&e))?,
                    other => return Err(bad(other)),
                };
                Ok(ArgValue::Int64(n))
            }
            "uint64" => {
                let n = match &value {
                    Value::Number(n) => n.as_u64().ok_or_else(|| bad(n))?,
                    Value::String(s) => s.parse::<u64>().map_err(|e| bad(&e))?,
                    other => return Err(bad(other)),
                };
                Ok(ArgValue::Uint64(n))
            }
            "bool" => value.as_bool().map(ArgValue::Bool).ok_or_else(|| bad(&value)),
            other => Err(SdkError::invalid(format!("unknown argument type: {other}"))),
        }
    }
}

impl From<ArgValue> for (String, Value) {
    fn from(arg: ArgValue) -> Self {
        let ty = arg.type_name().to_string();
        let value = match arg {
            ArgValue::Name(scope) => Value::String(scope.to_string()),
            ArgValue::String(s) => Value::String(s),
            ArgValue::Checksum256(c) => Value::String(c.to_hex()),
            ArgValue::PublicKey(k) => Value::String(k.to_hex()),
            ArgValue::Int64(n) => Value::from(n),
            ArgValue::Uint64(n) => Value::from(n),
            ArgValue::Bool(b) => Value::Bool(b),
        };
        (ty, value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    pub key: String,
    pub value: ArgValue,
}

impl Arg {
    pub fn new(key: impl Into<String>, value: ArgValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// An argument list with unique keys. Unknown keys are carried but ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Arg>", into = "Vec<Arg>")]
pub struct ArgList(Vec<Arg>);

impl ArgList {
    pub fn new(args: Vec<Arg>) -> SdkResult<Self> {
        for (i, arg) in args.iter().enumerate() {
            if args[..i].iter().any(|prev| prev.key == arg.key) {
                return Err(SdkError::invalid(format!("duplicate argument: {}", arg.key)));
            }
        }
        Ok(Self(args))
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.iter().find(|arg| arg.key == key).map(|arg| &arg.value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add or replace an argument.
    pub fn set(&mut self, key: &str, value: ArgValue) {
        match self.0.iter_mut().find(|arg| arg.key == key) {
            Some(arg) => arg.value = value,
            None => self.0.push(Arg::new(key, value)),
        }
    }

    /// The tenant the action targets.
    pub fn company(&self) -> SdkResult<Scope> {
        match self.get("company") {
            Some(ArgValue::Name(scope)) => Ok(scope.clone()),
            Some(other) => Err(mismatch("company", "name", other)),
            None => Err(SdkError::invalid("company is missing.")),
        }
    }

    /// The natural id of the row the action targets.
    pub fn natural_id(&self, table: TableName) -> SdkResult<String> {
        self.string(id_key(table))?
            .ok_or_else(|| SdkError::invalid(format!("{table} id is missing.")))
    }

    pub fn string(&self, key: &str) -> SdkResult<Option<String>> {
        match self.get(key) {
            Some(ArgValue::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(mismatch(key, "string", other)),
            None => Ok(None),
        }
    }

    pub fn checksum(&self, key: &str) -> SdkResult<Option<Checksum>> {
        match self.get(key) {
            Some(ArgValue::Checksum256(c)) => Ok(Some(*c)),
            Some(other) => Err(mismatch(key, "checksum256", other)),
            None => Ok(None),
        }
    }

    pub fn public_key(&self, key: &str) -> SdkResult<Option<VerifyingKey>> {
        match self.get(key) {
            Some(ArgValue::PublicKey(k)) => Ok(Some(k.clone())),
            Some(other) => Err(mismatch(key, "public_key", other)),
            None => Ok(None),
        }
    }
}

fn mismatch(key: &str, expected: &str, got: &ArgValue) -> SdkError {
    SdkError::invalid(format!(
        "{key} must be {expected}, got {}",
        got.type_name()
    ))
}

impl TryFrom<Vec<Arg>> for ArgList {
    type Error = SdkError;

    fn try_from(args: Vec<Arg>) -> Result<Self, Self::Error> {
        Self::new(args)
    }
}

impl From<ArgList> for Vec<Arg> {
    fn from(list: ArgList) -> Self {
        list.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_args(doc: Value) -> SdkResult<ArgList> {
        serde_json::from_value(doc).map_err(|e| SdkError::invalid(e.to_string()))
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    #[test]
    fn parses_every_action_name() {
        for verb in [Verb::New, Verb::Edit, Verb::Del] {
            for table in TableName::ALL {
                let name = ActionName::new(verb, table);
                assert_eq!(name.to_string().parse::<ActionName>().unwrap(), name);
            }
        }
        assert_eq!(
            "editprodins".parse::<ActionName>().unwrap(),
            ActionName::new(Verb::Edit, TableName::ProductInstance)
        );
    }

    #[test]
    fn rejects_unknown_action_names() {
        for bad in ["newrecipe", "createbatch", "new", "delproductins", "push"] {
            assert!(bad.parse::<ActionName>().is_err(), "{bad}");
        }
    }

    #[test]
    fn push_verbs() {
        assert_eq!(Verb::from_push("create"), Some(Verb::New));
        assert_eq!(Verb::from_push("patch"), Some(Verb::Edit));
        assert_eq!(Verb::from_push("remove"), Some(Verb::Del));
        assert_eq!(Verb::from_push("delete"), None);
    }

    // -----------------------------------------------------------------------
    // Argument lists
    // -----------------------------------------------------------------------

    #[test]
    fn parses_typed_arguments() {
        let site = "0".repeat(63) + "1";
        let args = parse_args(json!([
            {"key": "company", "value": ["name", "raptor"]},
            {"key": "machineId", "value": ["string", "MACH-1"]},
            {"key": "site", "value": ["checksum256", site]},
            {"key": "count", "value": ["uint64", "42"]},
            {"key": "delta", "value": ["int64", -3]},
            {"key": "flag", "value": ["bool", true]}
        ]))
        .unwrap();

        assert_eq!(args.company().unwrap().as_str(), "raptor");
        assert_eq!(args.natural_id(TableName::Machine).unwrap(), "MACH-1");
        assert_eq!(args.checksum("site").unwrap().unwrap().to_hex(), site);
        assert_eq!(args.get("count"), Some(&ArgValue::Uint64(42)));
        assert_eq!(args.get("delta"), Some(&ArgValue::Int64(-3)));
        assert_eq!(args.get("flag"), Some(&ArgValue::Bool(true)));
        assert_eq!(args.string("name").unwrap(), None);
    }

    #[test]
    fn missing_company_and_id_messages() {
        let args = parse_args(json!([{"key": "batchId", "value": ["string", "CHE-1"]}])).unwrap();
        assert_eq!(args.company().unwrap_err().to_string(), "company is missing.");

        let args = parse_args(json!([{"key": "company", "value": ["name", "raptor"]}])).unwrap();
        assert_eq!(
            args.natural_id(TableName::Batch).unwrap_err().to_string(),
            "batch id is missing."
        );
    }

    #[test]
    fn wrong_value_type_is_invalid() {
        let args = parse_args(json!([
            {"key": "company", "value": ["string", "raptor"]},
            {"key": "batchId", "value": ["uint64", 1]}
        ]))
        .unwrap();
        assert!(matches!(args.company(), Err(SdkError::InvalidArgument(_))));
        assert!(matches!(
            args.natural_id(TableName::Batch),
            Err(SdkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn malformed_values_are_rejected() {
        for doc in [
            json!([{"key": "company", "value": ["name", "Not Valid"]}]),
            json!([{"key": "site", "value": ["checksum256", "abc"]}]),
            json!([{"key": "key", "value": ["public_key", "zz"]}]),
            json!([{"key": "n", "value": ["uint64", -1]}]),
            json!([{"key": "x", "value": ["float", 1.0]}]),
            json!([{"key": "x", "value": ["string", 1]}]),
        ] {
            assert!(parse_args(doc.clone()).is_err(), "{doc}");
        }
    }

    #[test]
    fn public_keys_are_hex_ed25519() {
        let key = tracelytics_crypto::SigningKey::from_bytes([7; 32]).verifying_key();
        let args = parse_args(json!([{"key": "key", "value": ["public_key", key.to_hex()]}]))
            .unwrap();
        assert_eq!(args.public_key("key").unwrap(), Some(key));

        let wallet = json!([{
            "key": "key",
            "value": ["public_key", "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV"]
        }]);
        assert!(matches!(parse_args(wallet), Err(SdkError::InvalidArgument(_))));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let doc = json!([
            {"key": "company", "value": ["name", "raptor"]},
            {"key": "company", "value": ["name", "acme"]}
        ]);
        assert!(parse_args(doc).is_err());
    }

    #[test]
    fn serializes_back_to_pairs() {
        let mut args = ArgList::default();
        args.set("company", ArgValue::Name(Scope::new("raptor").unwrap()));
        args.set("siteId", ArgValue::String("SITE-1".into()));
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            json!([
                {"key": "company", "value": ["name", "raptor"]},
                {"key": "siteId", "value": ["string", "SITE-1"]}
            ])
        );
    }

    #[test]
    fn action_data_cargo_defaults_to_empty() {
        let data = ActionData::parse(&json!({"args": []})).unwrap();
        assert!(data.cargo::<Value>().unwrap().is_empty());
        assert!(ActionData::parse(&json!({"cargo": []})).is_err());
    }
}
