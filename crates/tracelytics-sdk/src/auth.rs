//! The `push` authorization gate.
//!
//! A push wraps a create/patch/remove on behalf of a company user. The gate
//! runs these checks in order, failing with `Unauthorized` at the first miss:
//!
//! 1. the user exists in the company's user table
//! 2. `verify_data` equals the user's current nonce
//! 3. the user holds the `entity:action` capability
//! 4. the presented key is the user's stored key and signs `sha256(verify_data)`
//!
//! On success the nonce is advanced in the same critical section as the
//! checks, so a signed push is accepted at most once. The wrapped action runs
//! afterwards; its failure does not give the nonce back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_crypto::{checksum, Signature, VerifyingKey};
use tracelytics_ledger::{LedgerError, Tracelytics, User};
use tracelytics_store::TableStore;
use tracelytics_types::{Scope, TableName};
use tracing::{info, warn};

use crate::action::{table_for_entity, ActionData, ActionName, ArgList, ArgValue, Verb};
use crate::error::{SdkError, SdkResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    /// Decimal nonce; its sha256 is the signed message.
    #[serde(alias = "verifydata")]
    pub verify_data: String,
    #[serde(alias = "sig")]
    pub signature: Signature,
    #[serde(alias = "pk")]
    pub public_key: VerifyingKey,
    pub username: String,
    pub company: Scope,
    /// Entity name as used in action names (`batch`, `prodins`, ...).
    pub entity: String,
    /// `create`, `patch` or `remove`.
    pub action: String,
    #[serde(default)]
    pub args: ArgList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<Value>,
}

impl PushRequest {
    pub fn parse(data: &Value) -> SdkResult<Self> {
        serde_json::from_value(data.clone())
            .map_err(|e| SdkError::invalid(format!("malformed push: {e}")))
    }

    /// The wrapped action, with `company` filled in from the push.
    pub fn wrapped(&self) -> SdkResult<(ActionName, ActionData)> {
        let verb = Verb::from_push(&self.action)
            .ok_or_else(|| SdkError::invalid(format!("unknown push action: {}", self.action)))?;
        let table = table_for_entity(&self.entity)
            .ok_or_else(|| SdkError::invalid(format!("unknown entity: {}", self.entity)))?;

        let mut args = self.args.clone();
        match args.get("company") {
            None => args.set("company", ArgValue::Name(self.company.clone())),
            Some(ArgValue::Name(scope)) if *scope == self.company => {}
            Some(_) => {
                return Err(SdkError::Unauthorized(
                    "wrapped action targets another company".into(),
                ))
            }
        }

        Ok((
            ActionName::new(verb, table),
            ActionData {
                args,
                cargo: self.cargo.clone(),
            },
        ))
    }
}

/// Run the gate checks and advance the user's nonce.
///
/// Returns the wrapped action to dispatch.
pub fn authorize<S: TableStore>(
    service: &Tracelytics<S>,
    push: &PushRequest,
) -> SdkResult<(ActionName, ActionData)> {
    let wrapped = push.wrapped()?;
    let nonce: u64 = push
        .verify_data
        .trim()
        .parse()
        .map_err(|_| {
            SdkError::invalid(format!("verify data is not a nonce: {:?}", push.verify_data))
        })?;

    let result = service.modify::<User, _>(&push.company, &push.username, |user| {
        if user.nonce != nonce {
            return Err(LedgerError::Unauthorized("incorrect nonce".into()));
        }
        if !user.can(&push.entity, &push.action) {
            return Err(LedgerError::Unauthorized("invalid permissions".into()));
        }
        let stored = user
            .verifying_key()?
            .ok_or_else(|| LedgerError::Unauthorized("user has no key".into()))?;
        if stored != push.public_key {
            return Err(LedgerError::Unauthorized("public key mismatch".into()));
        }
        push.public_key
            .verify_checksum(&checksum(&push.verify_data), &push.signature)
            .map_err(|_| LedgerError::Unauthorized("invalid signature".into()))?;
        user.bump_nonce()
    });

    match result {
        Ok(user) => {
            info!(
                company = %push.company,
                user = %push.username,
                entity = %push.entity,
                action = %push.action,
                nonce = user.nonce,
                "push authorized"
            );
            Ok(wrapped)
        }
        Err(err) => {
            let err = match err {
                LedgerError::NotFound {
                    table: TableName::User,
                    ..
                } => SdkError::Unauthorized("user does not exist".into()),
                LedgerError::InvalidArgument(msg) if push.username.is_empty() => {
                    SdkError::Unauthorized(msg)
                }
                LedgerError::Unauthorized(msg) => SdkError::Unauthorized(msg),
                other => SdkError::Ledger(other),
            };
            warn!(company = %push.company, user = %push.username, error = %err, "push rejected");
            Err(err)
        }
    }
}
