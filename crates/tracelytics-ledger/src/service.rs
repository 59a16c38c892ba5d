use std::sync::Arc;

use serde_json::Value;
use tracelytics_crypto::checksum;
use tracelytics_store::{StoreError, TableStore};
use tracelytics_types::{Checksum, Scope, TableName};
use tracing::debug;

use crate::entity::{DeleteRequest, Entity, Request};
use crate::error::{LedgerError, LedgerResult};

/// Entity operations over a table store backend.
///
/// Every operation derives the row's checksum from its natural id and
/// delegates to the store, which serializes it against other writers of the
/// same (scope, table).
pub struct Tracelytics<S> {
    store: Arc<S>,
}

impl<S: TableStore> Tracelytics<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a row. Fails with `DuplicateKey` if the natural id is taken.
    pub fn create<E: Entity>(&self, request: E::Create) -> LedgerResult<E> {
        let scope = request.company().clone();
        let checksum = natural_checksum(E::TABLE, request.natural_id())?;

        let mut created: Option<E> = None;
        self.store
            .insert(&scope, E::TABLE, checksum, |primary_key| {
                let row = E::create(primary_key, checksum, request)?;
                let value = serde_json::to_value(&row)?;
                created = Some(row);
                Ok::<_, LedgerError>(value)
            })?;
        let row = created.ok_or_else(|| {
            LedgerError::Store(StoreError::Serialization(format!(
                "{} row was inserted without being built",
                E::TABLE
            )))
        })?;
        debug!(
            table = %E::TABLE,
            %scope,
            id = row.natural_id(),
            primary_key = row.primary_key(),
            checksum = %row.checksum().short_hex(),
            "created"
        );
        Ok(row)
    }

    /// Apply a partial edit. Fails with `NotFound` if the row is absent.
    pub fn edit<E: Entity>(&self, request: E::Edit) -> LedgerResult<E> {
        let scope = request.company().clone();
        let id = request.natural_id().to_string();
        debug!(table = %E::TABLE, %scope, %id, "edit");
        self.modify(&scope, &id, |row: &mut E| row.edit(request))
    }

    /// Run `f` on a row inside the store's critical section.
    ///
    /// Nothing is written if `f` fails or touches the row's key fields.
    pub fn modify<E, F>(&self, scope: &Scope, natural_id: &str, f: F) -> LedgerResult<E>
    where
        E: Entity,
        F: FnOnce(&mut E) -> LedgerResult<()>,
    {
        let checksum = natural_checksum(E::TABLE, natural_id)?;
        let stored = self.store.update(scope, E::TABLE, checksum, |row| {
            let mut entity: E = serde_json::from_value(row.data.clone())?;
            f(&mut entity)?;
            if entity.primary_key() != row.primary_key
                || entity.checksum() != checksum
                || entity.natural_id() != natural_id
            {
                return Err(LedgerError::invalid(format!(
                    "{} key fields cannot be edited",
                    E::TABLE
                )));
            }
            row.data = serde_json::to_value(&entity)?;
            Ok::<_, LedgerError>(())
        })?;
        Ok(serde_json::from_value(stored.data)?)
    }

    /// Remove a row and return its last state.
    pub fn delete<E: Entity>(&self, request: &DeleteRequest) -> LedgerResult<E> {
        let checksum = natural_checksum(E::TABLE, request.natural_id())?;
        debug!(table = %E::TABLE, scope = %request.company, id = %request.id, "delete");
        let removed = self.store.delete(&request.company, E::TABLE, checksum)?;
        let row: E = serde_json::from_value(removed.data)?;
        debug!(table = %E::TABLE, primary_key = row.primary_key(), "deleted");
        Ok(row)
    }

    /// Look a row up by natural id.
    pub fn get<E: Entity>(&self, scope: &Scope, natural_id: &str) -> LedgerResult<Option<E>> {
        let checksum = natural_checksum(E::TABLE, natural_id)?;
        self.get_by_checksum(scope, checksum)
    }

    pub fn get_by_checksum<E: Entity>(
        &self,
        scope: &Scope,
        checksum: Checksum,
    ) -> LedgerResult<Option<E>> {
        self.store
            .get(scope, E::TABLE, checksum)?
            .map(|row| serde_json::from_value(row.data))
            .transpose()
            .map_err(LedgerError::from)
    }

    /// Up to `limit` typed rows from `lower_bound` on, in checksum order.
    pub fn find<E: Entity>(
        &self,
        scope: &Scope,
        lower_bound: Checksum,
        limit: usize,
    ) -> LedgerResult<Vec<E>> {
        self.store
            .find(scope, E::TABLE, lower_bound, limit)?
            .into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(LedgerError::from))
            .collect()
    }

    /// Untyped variant of [`find`](Self::find) for the query path.
    pub fn find_rows(
        &self,
        scope: &Scope,
        table: TableName,
        lower_bound: Checksum,
        limit: usize,
    ) -> LedgerResult<Vec<Value>> {
        Ok(self
            .store
            .find(scope, table, lower_bound, limit)?
            .into_iter()
            .map(|row| row.data)
            .collect())
    }
}

impl<S> Clone for Tracelytics<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TableStore + std::fmt::Debug> std::fmt::Debug for Tracelytics<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracelytics")
            .field("store", &self.store)
            .finish()
    }
}

/// Secondary key of a natural id. Empty ids are rejected.
pub fn natural_checksum(table: TableName, natural_id: &str) -> LedgerResult<Checksum> {
    if natural_id.is_empty() {
        return Err(LedgerError::invalid(format!("{table} id is missing.")));
    }
    Ok(checksum(natural_id))
}
