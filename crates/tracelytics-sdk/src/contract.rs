use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracelytics_ledger::{
    schema, Batch, Delivery, Entity, Machine, Product, ProductInstance, Site, TableSchema,
    Tracelytics, User,
};
use tracelytics_store::TableStore;
use tracelytics_types::{Checksum, Scope, TableName};
use tracing::debug;

use crate::action::{Action, ActionData, ActionName, ArgList, Verb};
use crate::auth::{authorize, PushRequest};
use crate::error::SdkResult;
use crate::requests;

/// Row limits for table queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Rows returned when a query gives no limit.
    pub default_limit: usize,
    /// Upper bound applied to any requested limit.
    pub max_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 1000,
        }
    }
}

impl QueryConfig {
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) => n.min(self.max_limit),
            None => self.default_limit.min(self.max_limit),
        }
    }
}

/// A `get_table_rows` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    pub scope: Scope,
    pub table: TableName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<Checksum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl TableQuery {
    pub fn new(scope: Scope, table: TableName) -> Self {
        Self {
            scope,
            table,
            lower_bound: None,
            limit: None,
        }
    }
}

/// The action-facing surface of a Tracelytics deployment.
///
/// Every mutating action returns the affected row as JSON: the new state for
/// `new`/`edit`, the removed state for `del`.
pub struct Contract<S> {
    service: Tracelytics<S>,
    config: QueryConfig,
}

impl<S: TableStore> Contract<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, QueryConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: QueryConfig) -> Self {
        Self {
            service: Tracelytics::new(store),
            config,
        }
    }

    pub fn service(&self) -> &Tracelytics<S> {
        &self.service
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Execute a named action.
    pub fn execute(&self, action: &Action) -> SdkResult<Value> {
        if action.name == "push" {
            return self.push(&PushRequest::parse(&action.data)?);
        }
        let name = ActionName::from_str(&action.name)?;
        let data = ActionData::parse(&action.data)?;
        self.dispatch(name, &data)
    }

    /// Authorize a push, consume the nonce, then run the wrapped action.
    pub fn push(&self, request: &PushRequest) -> SdkResult<Value> {
        let (name, data) = authorize(&self.service, request)?;
        self.dispatch(name, &data)
    }

    pub fn dispatch(&self, name: ActionName, data: &ActionData) -> SdkResult<Value> {
        debug!(action = %name, "dispatch");
        let args = &data.args;
        let svc = &self.service;
        match (name.verb, name.table) {
            (Verb::New, TableName::Batch) => row(svc.create::<Batch>(requests::new_batch(args)?)?),
            (Verb::New, TableName::Delivery) => {
                row(svc.create::<Delivery>(requests::new_delivery(data)?)?)
            }
            (Verb::New, TableName::Machine) => {
                row(svc.create::<Machine>(requests::new_machine(args)?)?)
            }
            (Verb::New, TableName::Product) => {
                row(svc.create::<Product>(requests::new_product(args)?)?)
            }
            (Verb::New, TableName::ProductInstance) => row(
                svc.create::<ProductInstance>(requests::new_product_instance(args)?)?,
            ),
            (Verb::New, TableName::Site) => row(svc.create::<Site>(requests::new_site(args)?)?),
            (Verb::New, TableName::User) => row(svc.create::<User>(requests::new_user(args)?)?),

            (Verb::Edit, TableName::Batch) => row(svc.edit::<Batch>(requests::edit_batch(args)?)?),
            (Verb::Edit, TableName::Delivery) => {
                row(svc.edit::<Delivery>(requests::edit_delivery(data)?)?)
            }
            (Verb::Edit, TableName::Machine) => {
                row(svc.edit::<Machine>(requests::edit_machine(args)?)?)
            }
            (Verb::Edit, TableName::Product) => {
                row(svc.edit::<Product>(requests::edit_product(args)?)?)
            }
            (Verb::Edit, TableName::ProductInstance) => row(
                svc.edit::<ProductInstance>(requests::edit_product_instance(args)?)?,
            ),
            (Verb::Edit, TableName::Site) => row(svc.edit::<Site>(requests::edit_site(args)?)?),
            (Verb::Edit, TableName::User) => row(svc.edit::<User>(requests::edit_user(args)?)?),

            (Verb::Del, TableName::Batch) => self.remove::<Batch>(args),
            (Verb::Del, TableName::Delivery) => self.remove::<Delivery>(args),
            (Verb::Del, TableName::Machine) => self.remove::<Machine>(args),
            (Verb::Del, TableName::Product) => self.remove::<Product>(args),
            (Verb::Del, TableName::ProductInstance) => self.remove::<ProductInstance>(args),
            (Verb::Del, TableName::Site) => self.remove::<Site>(args),
            (Verb::Del, TableName::User) => self.remove::<User>(args),
        }
    }

    fn remove<E: Entity>(&self, args: &ArgList) -> SdkResult<Value> {
        let request = requests::delete(E::TABLE, args)?;
        row(self.service.delete::<E>(&request)?)
    }

    /// Rows of one table in checksum order, starting at `lower_bound`.
    pub fn get_table_rows(&self, query: &TableQuery) -> SdkResult<Vec<Value>> {
        let limit = self.config.effective_limit(query.limit);
        let lower_bound = query.lower_bound.unwrap_or(Checksum::ZERO);
        Ok(self
            .service
            .find_rows(&query.scope, query.table, lower_bound, limit)?)
    }

    /// The persisted table layout.
    pub fn schema(&self) -> Vec<TableSchema> {
        schema()
    }
}

impl<S> Clone for Contract<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            config: self.config,
        }
    }
}

impl<S: TableStore + std::fmt::Debug> std::fmt::Debug for Contract<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("service", &self.service)
            .field("config", &self.config)
            .finish()
    }
}

fn row<E: Serialize>(entity: E) -> SdkResult<Value> {
    Ok(serde_json::to_value(entity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SdkError};
    use serde_json::json;
    use tracelytics_crypto::{checksum, SigningKey};
    use tracelytics_store::InMemoryTableStore;

    fn contract() -> Contract<InMemoryTableStore> {
        Contract::new(Arc::new(InMemoryTableStore::new()))
    }

    fn raptor() -> Scope {
        Scope::new("raptor").unwrap()
    }

    fn run(c: &Contract<InMemoryTableStore>, name: &str, data: Value) -> SdkResult<Value> {
        c.execute(&Action::new(name, data))
    }

    fn rows(c: &Contract<InMemoryTableStore>, table: TableName) -> Vec<Value> {
        c.get_table_rows(&TableQuery::new(raptor(), table)).unwrap()
    }

    fn batch_args(user: &str) -> Value {
        json!({"args": [
            {"key": "company",   "value": ["name", "raptor"]},
            {"key": "batchId",   "value": ["string", "CHE-1"]},
            {"key": "userId",    "value": ["string", user]},
            {"key": "machineId", "value": ["string", "MACH-1"]},
            {"key": "date",      "value": ["string", "2019-01-02"]}
        ]})
    }

    fn delete_args(key: &str, id: &str) -> Value {
        json!({"args": [
            {"key": "company", "value": ["name", "raptor"]},
            {"key": key,       "value": ["string", id]}
        ]})
    }

    // -----------------------------------------------------------------------
    // Entity lifecycles
    // -----------------------------------------------------------------------

    #[test]
    fn batch_lifecycle() {
        let c = contract();
        run(&c, "newbatch", batch_args("syed1")).unwrap();
        assert_eq!(
            rows(&c, TableName::Batch),
            vec![json!({
                "id": 0,
                "batch_checksum": checksum("CHE-1").to_hex(),
                "batch_id": "CHE-1",
                "user_id": "syed1",
                "machine_id": "MACH-1",
                "date": "2019-01-02",
                "data": []
            })]
        );

        run(&c, "editbatch", batch_args("syed2")).unwrap();
        assert_eq!(rows(&c, TableName::Batch)[0]["user_id"], "syed2");

        run(&c, "delbatch", delete_args("batchId", "CHE-1")).unwrap();
        assert!(rows(&c, TableName::Batch).is_empty());
    }

    #[test]
    fn duplicate_create_and_missing_edit() {
        let c = contract();
        run(&c, "newbatch", batch_args("syed1")).unwrap();
        let err = run(&c, "newbatch", batch_args("syed1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);

        run(&c, "delbatch", delete_args("batchId", "CHE-1")).unwrap();
        let err = run(&c, "editbatch", batch_args("syed2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = run(&c, "delbatch", delete_args("batchId", "CHE-1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn recreated_row_gets_a_fresh_primary_key() {
        let c = contract();
        run(&c, "newbatch", batch_args("syed1")).unwrap();
        run(&c, "delbatch", delete_args("batchId", "CHE-1")).unwrap();
        let row = run(&c, "newbatch", batch_args("syed1")).unwrap();
        assert_eq!(row["id"], 1);
    }

    #[test]
    fn delivery_cargo_edit() {
        let c = contract();
        run(
            &c,
            "newdelivery",
            json!({
                "args": [
                    {"key": "company",    "value": ["name", "raptor"]},
                    {"key": "deliveryId", "value": ["string", "DEL-1"]},
                    {"key": "shipperId",  "value": ["string", "UPS"]},
                    {"key": "driverId",   "value": ["string", "DRI-1"]},
                    {"key": "startTime",  "value": ["string", "2019-01-02"]},
                    {"key": "status",     "value": ["string", "enroute"]}
                ],
                "cargo": [{
                    "key": checksum("PRODUCT-1").to_hex(),
                    "value": {
                        "product_checksum": checksum("PRODUCT NAME").to_hex(),
                        "quantity": 4,
                        "delta": 0
                    }
                }]
            }),
        )
        .unwrap();

        let edited = run(
            &c,
            "editdelivery",
            json!({
                "args": [
                    {"key": "company",    "value": ["name", "raptor"]},
                    {"key": "deliveryId", "value": ["string", "DEL-1"]},
                    {"key": "endTime",    "value": ["string", "2019-01-05"]},
                    {"key": "status",     "value": ["string", "delivered"]}
                ],
                "cargo": []
            }),
        )
        .unwrap();
        assert_eq!(edited["status"], "delivered");
        assert_eq!(edited["end_time"], "2019-01-05");
        assert_eq!(edited["shipper_id"], "UPS");
        assert_eq!(edited["cargo"][0]["value"]["quantity"], 4);

        let edited = run(
            &c,
            "editdelivery",
            json!({
                "args": [
                    {"key": "company",    "value": ["name", "raptor"]},
                    {"key": "deliveryId", "value": ["string", "DEL-1"]}
                ],
                "cargo": [{"item_id": "PRODUCT-1", "product_id": "PRODUCT NAME", "delta": -3}]
            }),
        )
        .unwrap();
        assert_eq!(edited["cargo"][0]["value"]["quantity"], 1);
        assert_eq!(edited["cargo"][0]["value"]["delta"], -3);
    }

    #[test]
    fn machine_defaults_to_zero_site() {
        let c = contract();
        let row = run(
            &c,
            "newmachine",
            json!({"args": [
                {"key": "company",   "value": ["name", "raptor"]},
                {"key": "machineId", "value": ["string", "MACH-1"]},
                {"key": "name",      "value": ["string", "Press"]}
            ]}),
        )
        .unwrap();
        assert_eq!(row["site"], Checksum::ZERO.to_hex());
    }

    #[test]
    fn product_instance_site_label() {
        let c = contract();
        let row = run(
            &c,
            "newprodins",
            json!({"args": [
                {"key": "company",      "value": ["name", "raptor"]},
                {"key": "productinsId", "value": ["string", "PI-1"]},
                {"key": "product",      "value": ["string", "PRODUCT-1"]},
                {"key": "siteId",       "value": ["string", "SITE-1"]}
            ]}),
        )
        .unwrap();
        assert_eq!(row["site_id"], "SITE-1");
        assert_eq!(row["site_checksum"], checksum("SITE-1").to_hex());
    }

    // -----------------------------------------------------------------------
    // Argument errors
    // -----------------------------------------------------------------------

    #[test]
    fn missing_company_and_id_messages() {
        let c = contract();
        let err = run(&c, "newsite", json!({"args": []})).unwrap_err();
        assert_eq!(err.to_string(), "company is missing.");

        let err = run(
            &c,
            "newsite",
            json!({"args": [{"key": "company", "value": ["name", "raptor"]}]}),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "site id is missing.");
    }

    #[test]
    fn unknown_action_is_invalid() {
        let c = contract();
        let err = run(&c, "newwidget", json!({"args": []})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[test]
    fn query_limits_and_bounds() {
        let c = Contract::with_config(
            Arc::new(InMemoryTableStore::new()),
            QueryConfig {
                default_limit: 2,
                max_limit: 3,
            },
        );
        for id in ["S1", "S2", "S3", "S4", "S5"] {
            run(&c, "newsite", delete_args("siteId", id)).unwrap();
        }

        assert_eq!(rows(&c, TableName::Site).len(), 2);

        let mut query = TableQuery::new(raptor(), TableName::Site);
        query.limit = Some(100);
        let all = c.get_table_rows(&query).unwrap();
        assert_eq!(all.len(), 3);

        let checksums: Vec<&str> = all
            .iter()
            .map(|r| r["site_checksum"].as_str().unwrap())
            .collect();
        let mut sorted = checksums.clone();
        sorted.sort();
        assert_eq!(checksums, sorted);

        query.lower_bound = Some(Checksum::from_hex(checksums[1]).unwrap());
        let tail = c.get_table_rows(&query).unwrap();
        assert_eq!(tail[0]["site_checksum"], checksums[1]);
    }

    #[test]
    fn query_is_scoped() {
        let c = contract();
        run(&c, "newsite", delete_args("siteId", "S1")).unwrap();
        let other = TableQuery::new(Scope::new("acme").unwrap(), TableName::Site);
        assert!(c.get_table_rows(&other).unwrap().is_empty());
    }

    #[test]
    fn schema_lists_every_table() {
        let names: Vec<TableName> = contract().schema().into_iter().map(|t| t.name).collect();
        assert_eq!(names, TableName::ALL.to_vec());
    }

    // -----------------------------------------------------------------------
    // Push
    // -----------------------------------------------------------------------

    fn enroll(c: &Contract<InMemoryTableStore>, permissions: &str) -> SigningKey {
        let sk = SigningKey::generate();
        run(
            c,
            "newuser",
            json!({"args": [
                {"key": "company",     "value": ["name", "raptor"]},
                {"key": "userId",      "value": ["string", "syed1"]},
                {"key": "key",         "value": ["public_key", sk.verifying_key().to_hex()]},
                {"key": "permissions", "value": ["string", permissions]}
            ]}),
        )
        .unwrap();
        sk
    }

    fn push_doc(sk: &SigningKey, nonce: &str, action: &str, args: Value) -> Value {
        json!({
            "verifydata": nonce,
            "sig": sk.sign_checksum(&checksum(nonce)).to_hex(),
            "pk": sk.verifying_key().to_hex(),
            "username": "syed1",
            "company": "raptor",
            "entity": "site",
            "action": action,
            "args": args
        })
    }

    #[test]
    fn push_dispatches_wrapped_action() {
        let c = contract();
        let sk = enroll(&c, "site:create,site:remove");
        let args = json!([{"key": "siteId", "value": ["string", "SITE-1"]}]);

        let row = run(&c, "push", push_doc(&sk, "0", "create", args.clone())).unwrap();
        assert_eq!(row["site_id"], "SITE-1");

        run(&c, "push", push_doc(&sk, "1", "remove", args)).unwrap();
        assert!(rows(&c, TableName::Site).is_empty());

        let user = c.service().get::<User>(&raptor(), "syed1").unwrap().unwrap();
        assert_eq!(user.nonce, 2);
    }

    #[test]
    fn failed_wrapped_action_still_consumes_nonce() {
        let c = contract();
        let sk = enroll(&c, "site:patch");
        let args = json!([{"key": "siteId", "value": ["string", "NOWHERE"]}]);

        let err = run(&c, "push", push_doc(&sk, "0", "patch", args)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let user = c.service().get::<User>(&raptor(), "syed1").unwrap().unwrap();
        assert_eq!(user.nonce, 1);
    }

    #[test]
    fn push_without_permission_changes_nothing() {
        let c = contract();
        let sk = enroll(&c, "batch:create");
        let args = json!([{"key": "siteId", "value": ["string", "SITE-1"]}]);

        let err = run(&c, "push", push_doc(&sk, "0", "create", args)).unwrap_err();
        assert!(matches!(err, SdkError::Unauthorized(_)));
        assert!(rows(&c, TableName::Site).is_empty());
    }
}
