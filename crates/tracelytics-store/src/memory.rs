use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde_json::Value;
use tracelytics_types::{Checksum, Scope, TableName};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::row::StoredRow;
use crate::snapshot::{PartitionSnapshot, StoreSnapshot};
use crate::traits::TableStore;

type PartitionKey = (Scope, TableName);

/// One (scope, table) partition.
///
/// `retired` is set by `clear` on partitions it drops from the map; a writer
/// that reaches one through a stale handle looks the partition up again.
#[derive(Debug, Default)]
struct Partition {
    rows: BTreeMap<Checksum, StoredRow>,
    next_primary_key: u64,
    retired: bool,
}

impl Partition {
    fn insert_row<F, E>(
        &mut self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
        build: F,
    ) -> Result<u64, E>
    where
        F: FnOnce(u64) -> Result<Value, E>,
        E: From<StoreError>,
    {
        if self.rows.contains_key(&checksum) {
            return Err(StoreError::DuplicateKey {
                scope: scope.clone(),
                table,
                checksum,
            }
            .into());
        }

        let primary_key = self.next_primary_key;
        let data = build(primary_key)?;
        self.next_primary_key += 1;
        self.rows
            .insert(checksum, StoredRow::new(primary_key, checksum, data));

        debug!(%scope, %table, checksum = %checksum.short_hex(), primary_key, "row inserted");
        Ok(primary_key)
    }
}

/// In-memory table store.
///
/// The partition map sits behind a `RwLock` that is only write-locked to add
/// a partition. Each partition has its own `Mutex`, held for the whole
/// read-modify-write cycle of a mutation, so different scopes and tables
/// proceed in parallel.
pub struct InMemoryTableStore {
    partitions: RwLock<HashMap<PartitionKey, Arc<Mutex<Partition>>>>,
}

impl InMemoryTableStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of rows across all partitions.
    pub fn total_rows(&self) -> StoreResult<usize> {
        let map = self
            .partitions
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        let mut total = 0;
        for partition in map.values() {
            total += lock(partition)?.rows.len();
        }
        Ok(total)
    }

    /// Capture every partition, including primary-key counters.
    pub fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let map = self
            .partitions
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        let mut partitions = Vec::with_capacity(map.len());
        for ((scope, table), partition) in map.iter() {
            let guard = lock(partition)?;
            partitions.push(PartitionSnapshot {
                scope: scope.clone(),
                table: *table,
                next_primary_key: guard.next_primary_key,
                rows: guard.rows.values().cloned().collect(),
            });
        }
        partitions.sort_by(|a, b| (&a.scope, a.table).cmp(&(&b.scope, b.table)));
        Ok(StoreSnapshot::new(partitions))
    }

    /// Rebuild a store from a snapshot, validating its invariants.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        snapshot.check_version()?;
        let mut map = HashMap::with_capacity(snapshot.partitions.len());
        for part in snapshot.partitions {
            let key = (part.scope.clone(), part.table);
            if map.contains_key(&key) {
                return Err(StoreError::CorruptSnapshot(format!(
                    "partition {}/{} listed twice",
                    part.scope, part.table
                )));
            }
            let mut rows = BTreeMap::new();
            let mut seen_keys = std::collections::HashSet::new();
            for row in part.rows {
                if row.primary_key >= part.next_primary_key {
                    return Err(StoreError::CorruptSnapshot(format!(
                        "{}/{}: primary key {} is not below counter {}",
                        part.scope, part.table, row.primary_key, part.next_primary_key
                    )));
                }
                if !seen_keys.insert(row.primary_key) {
                    return Err(StoreError::CorruptSnapshot(format!(
                        "{}/{}: primary key {} used twice",
                        part.scope, part.table, row.primary_key
                    )));
                }
                if rows.insert(row.checksum, row).is_some() {
                    return Err(StoreError::CorruptSnapshot(format!(
                        "{}/{}: duplicate checksum",
                        part.scope, part.table
                    )));
                }
            }
            map.insert(
                key,
                Arc::new(Mutex::new(Partition {
                    rows,
                    next_primary_key: part.next_primary_key,
                    retired: false,
                })),
            );
        }
        Ok(Self {
            partitions: RwLock::new(map),
        })
    }

    fn partition(&self, scope: &Scope, table: TableName) -> StoreResult<Option<Arc<Mutex<Partition>>>> {
        let map = self
            .partitions
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(&(scope.clone(), table)).cloned())
    }
}

fn lock(partition: &Mutex<Partition>) -> StoreResult<MutexGuard<'_, Partition>> {
    partition.lock().map_err(|_| StoreError::LockPoisoned)
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for InMemoryTableStore {
    fn insert<F, E>(
        &self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
        build: F,
    ) -> Result<u64, E>
    where
        F: FnOnce(u64) -> Result<Value, E>,
        E: From<StoreError>,
    {
        loop {
            if let Some(partition) = self.partition(scope, table)? {
                let mut guard = lock(&partition)?;
                if guard.retired {
                    continue;
                }
                return guard.insert_row(scope, table, checksum, build);
            }

            // First row of this partition: build it off-map and publish it
            // only once the row is in.
            let mut map = self
                .partitions
                .write()
                .map_err(|_| StoreError::LockPoisoned)?;
            let key = (scope.clone(), table);
            if map.contains_key(&key) {
                continue;
            }
            let mut fresh = Partition::default();
            let primary_key = fresh.insert_row(scope, table, checksum, build)?;
            map.insert(key, Arc::new(Mutex::new(fresh)));
            return Ok(primary_key);
        }
    }

    fn update<F, E>(
        &self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
        mutator: F,
    ) -> Result<StoredRow, E>
    where
        F: FnOnce(&mut StoredRow) -> Result<(), E>,
        E: From<StoreError>,
    {
        let not_found = || StoreError::NotFound {
            scope: scope.clone(),
            table,
            checksum,
        };
        let partition = self.partition(scope, table)?.ok_or_else(not_found)?;
        let mut guard = lock(&partition)?;
        if guard.retired {
            return Err(not_found().into());
        }
        let current = guard.rows.get(&checksum).ok_or_else(not_found)?;

        let mut next = current.clone();
        mutator(&mut next)?;
        next.primary_key = current.primary_key;
        next.checksum = checksum;
        guard.rows.insert(checksum, next.clone());

        debug!(%scope, %table, checksum = %checksum.short_hex(), "row updated");
        Ok(next)
    }

    fn delete(
        &self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
    ) -> StoreResult<StoredRow> {
        let not_found = || StoreError::NotFound {
            scope: scope.clone(),
            table,
            checksum,
        };
        let partition = self.partition(scope, table)?.ok_or_else(not_found)?;
        let mut guard = lock(&partition)?;
        if guard.retired {
            return Err(not_found());
        }
        let removed = guard.rows.remove(&checksum).ok_or_else(not_found)?;

        debug!(%scope, %table, checksum = %checksum.short_hex(), primary_key = removed.primary_key, "row deleted");
        Ok(removed)
    }

    fn find(
        &self,
        scope: &Scope,
        table: TableName,
        lower_bound: Checksum,
        limit: usize,
    ) -> StoreResult<Vec<StoredRow>> {
        let Some(partition) = self.partition(scope, table)? else {
            return Ok(Vec::new());
        };
        let guard = lock(&partition)?;
        if guard.retired {
            return Ok(Vec::new());
        }
        Ok(guard
            .rows
            .range((Bound::Included(lower_bound), Bound::Unbounded))
            .take(limit)
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn get(
        &self,
        scope: &Scope,
        table: TableName,
        checksum: Checksum,
    ) -> StoreResult<Option<StoredRow>> {
        let Some(partition) = self.partition(scope, table)? else {
            return Ok(None);
        };
        let guard = lock(&partition)?;
        if guard.retired {
            return Ok(None);
        }
        Ok(guard.rows.get(&checksum).cloned())
    }

    fn scopes(&self) -> StoreResult<Vec<Scope>> {
        let map = self
            .partitions
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        let mut scopes: Vec<Scope> = map.keys().map(|(scope, _)| scope.clone()).collect();
        scopes.sort();
        scopes.dedup();
        Ok(scopes)
    }

    fn row_count(&self, scope: &Scope, table: TableName) -> StoreResult<usize> {
        match self.partition(scope, table)? {
            Some(partition) => {
                let guard = lock(&partition)?;
                Ok(if guard.retired { 0 } else { guard.rows.len() })
            }
            None => Ok(0),
        }
    }

    fn clear(&self) -> StoreResult<()> {
        let mut map = self
            .partitions
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        for partition in map.values() {
            lock(partition)?.retired = true;
        }
        map.clear();
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let partitions = self.partitions.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("InMemoryTableStore")
            .field("partition_count", &partitions)
            .finish()
    }
}
