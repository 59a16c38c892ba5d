use serde_json::Value;
use tracelytics_types::{Checksum, Scope, TableName};

use crate::error::{StoreError, StoreResult};
use crate::row::StoredRow;

/// Scoped, checksum-indexed table storage.
///
/// All implementations must satisfy these invariants:
/// - A checksum is unique within a (scope, table) partition.
/// - Primary keys are assigned from a per-partition counter under the same
///   lock as the insert, strictly increase, and are never handed out twice,
///   even after the row holding one is deleted.
/// - `insert`, `update` and `delete` are linearizable per partition. A losing
///   concurrent insert of the same checksum fails with `DuplicateKey`; a
///   losing update or delete of a removed row fails with `NotFound`.
/// - A failing builder or mutator leaves the partition unchanged.
/// - No operation ever observes rows of another scope.
///
/// Builders and mutators are generic over the caller's error type so that
/// validation failures raised inside the critical section surface unchanged.
pub trait TableStore: Send + Sync {
    /// Insert a new row under `checksum`.
    ///
    /// `build` receives the primary key the row will be stored under and
    /// returns the row's serialized data. The key is only consumed if `build`
    /// succeeds.
    fn insert<F, E>(
        &self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
        build: F,
    ) -> Result<u64, E>
    where
        F: FnOnce(u64) -> Result<Value, E>,
        E: From<StoreError>;

    /// Mutate the row stored under `checksum` and return its new state.
    ///
    /// The mutator works on a copy; the copy is committed only if it returns
    /// `Ok`. Changes to `primary_key` or `checksum` are discarded.
    fn update<F, E>(
        &self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
        mutator: F,
    ) -> Result<StoredRow, E>
    where
        F: FnOnce(&mut StoredRow) -> Result<(), E>,
        E: From<StoreError>;

    /// Remove the row stored under `checksum` and return it.
    fn delete(&self, scope: &Scope, table: TableName, checksum: Checksum)
        -> StoreResult<StoredRow>;

    /// Up to `limit` rows with checksum `>= lower_bound`, in checksum order.
    fn find(
        &self,
        scope: &Scope,
        table: TableName,
        lower_bound: Checksum,
        limit: usize,
    ) -> StoreResult<Vec<StoredRow>>;

    /// Exact lookup by checksum.
    ///
    /// Default implementation issues a single-row `find` from `checksum`.
    fn get(
        &self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
    ) -> StoreResult<Option<StoredRow>> {
        Ok(self
            .find(scope, table, checksum, 1)?
            .into_iter()
            .find(|row| row.checksum == checksum))
    }

    /// Every scope that has ever held a row, sorted.
    fn scopes(&self) -> StoreResult<Vec<Scope>>;

    /// Number of rows currently in a partition.
    fn row_count(&self, scope: &Scope, table: TableName) -> StoreResult<usize>;

    /// Drop every partition, including primary-key counters.
    ///
    /// A write racing with `clear` lands either before it (and is cleared)
    /// or in the emptied store.
    fn clear(&self) -> StoreResult<()>;
}
