use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_crypto::VerifyingKey;
use tracelytics_types::{Checksum, Scope, TableName};

use crate::entity::{impl_request, Entity};
use crate::error::{LedgerError, LedgerResult};
use crate::permissions::{has_permission, parse_permissions};
use crate::schema::{FieldSchema, DATA, ID};

/// A user allowed to push actions on behalf of a company.
///
/// `key` is the hex-encoded Ed25519 public key, empty until one is assigned.
/// `nonce` counts successful pushes and must be presented with the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub user_checksum: Checksum,
    pub user_id: String,
    pub key: String,
    pub nonce: u64,
    pub permissions: Vec<String>,
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub company: Scope,
    pub user_id: String,
    pub key: Option<VerifyingKey>,
    /// Comma-separated `entity:action` list.
    pub permissions: Option<String>,
}

impl NewUser {
    pub fn new(company: Scope, user_id: impl Into<String>) -> Self {
        Self {
            company,
            user_id: user_id.into(),
            key: None,
            permissions: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditUser {
    pub company: Scope,
    pub user_id: String,
    pub key: Option<VerifyingKey>,
    /// Replaces the whole permission set when present.
    pub permissions: Option<String>,
}

impl EditUser {
    pub fn new(company: Scope, user_id: impl Into<String>) -> Self {
        Self {
            company,
            user_id: user_id.into(),
            key: None,
            permissions: None,
        }
    }
}

impl_request!(NewUser, user_id);
impl_request!(EditUser, user_id);

impl User {
    /// The stored public key, if one has been assigned.
    pub fn verifying_key(&self) -> LedgerResult<Option<VerifyingKey>> {
        if self.key.is_empty() {
            return Ok(None);
        }
        VerifyingKey::from_hex(&self.key)
            .map(Some)
            .map_err(|e| LedgerError::invalid(format!("stored key for {}: {e}", self.user_id)))
    }

    pub fn can(&self, entity: &str, action: &str) -> bool {
        has_permission(&self.permissions, entity, action)
    }

    /// Advance the nonce after a successful push.
    pub fn bump_nonce(&mut self) -> LedgerResult<()> {
        self.nonce = self
            .nonce
            .checked_add(1)
            .ok_or_else(|| LedgerError::invalid("nonce overflow"))?;
        Ok(())
    }
}

impl Entity for User {
    const TABLE: TableName = TableName::User;
    const FIELDS: &'static [FieldSchema] = &[
        ID,
        FieldSchema::new("user_checksum", "checksum256"),
        FieldSchema::new("user_id", "string"),
        FieldSchema::with_default("key", "public_key", ""),
        FieldSchema::with_default("nonce", "uint64", "0"),
        FieldSchema::with_default("permissions", "string[]", "[]"),
        DATA,
    ];

    type Create = NewUser;
    type Edit = EditUser;

    fn create(id: u64, checksum: Checksum, request: NewUser) -> LedgerResult<Self> {
        let permissions = match request.permissions {
            Some(raw) => parse_permissions(&raw)?,
            None => Vec::new(),
        };
        Ok(Self {
            id,
            user_checksum: checksum,
            user_id: request.user_id,
            key: request.key.map(|k| k.to_hex()).unwrap_or_default(),
            nonce: 0,
            permissions,
            data: Vec::new(),
        })
    }

    fn edit(&mut self, request: EditUser) -> LedgerResult<()> {
        // Parse first so a bad list leaves the key untouched too.
        let permissions = request
            .permissions
            .as_deref()
            .map(parse_permissions)
            .transpose()?;
        if let Some(key) = request.key {
            self.key = key.to_hex();
        }
        if let Some(permissions) = permissions {
            self.permissions = permissions;
        }
        Ok(())
    }

    fn primary_key(&self) -> u64 {
        self.id
    }

    fn checksum(&self) -> Checksum {
        self.user_checksum
    }

    fn natural_id(&self) -> &str {
        &self.user_id
    }
}
