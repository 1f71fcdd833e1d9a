//! In-process entity store.
//!
//! Backs tests and offline tooling with per-kind ordered tables. Commits are
//! staged against a working copy of the touched table and swapped in only
//! when every operation succeeds, so a failed batch leaves nothing behind.

use crate::filter::{compare_values, QuerySpec, SortDirection};
use crate::{CommitReceipt, EntityStore, StagedBatch, StoreError, StoreResult, StoredRecord};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct MemoryInner {
    tables: HashMap<String, BTreeMap<i64, Value>>,
    /// Per-kind JSON pointers whose values must be unique within the kind.
    unique: HashMap<String, Vec<String>>,
    next_id: i64,
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a uniqueness constraint: within `kind`, no two rows may hold
    /// the same non-null value at `pointer`.
    pub fn add_unique_pointer(&self, kind: &str, pointer: &str) {
        let mut inner = self.lock();
        inner
            .unique
            .entry(kind.to_string())
            .or_default()
            .push(pointer.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().expect("memory store lock poisoned")
    }
}

/// Fails if `candidate` duplicates another row's value at any unique pointer.
fn check_unique(
    table: &BTreeMap<i64, Value>,
    pointers: &[String],
    candidate: &Value,
    candidate_id: i64,
) -> StoreResult<()> {
    for pointer in pointers {
        let Some(value) = candidate.pointer(pointer) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let duplicated = table
            .iter()
            .any(|(id, row)| *id != candidate_id && row.pointer(pointer) == Some(value));
        if duplicated {
            return Err(StoreError::Constraint(format!(
                "duplicate value at {pointer}: {value}"
            )));
        }
    }
    Ok(())
}

fn order_rows(rows: &mut [(i64, Value)], spec: &QuerySpec) {
    rows.sort_by(|(id_a, a), (id_b, b)| {
        for key in &spec.order {
            let va = a.pointer(&key.field).filter(|v| !v.is_null());
            let vb = b.pointer(&key.field).filter(|v| !v.is_null());
            let ord = match (va, vb) {
                (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                // Missing and null values sort last regardless of direction.
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = match key.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        id_a.cmp(id_b)
    });
}

impl EntityStore for MemoryStore {
    fn get(&self, kind: &str, id: i64) -> StoreResult<Option<StoredRecord>> {
        let inner = self.lock();
        Ok(inner
            .tables
            .get(kind)
            .and_then(|table| table.get(&id))
            .map(|data| StoredRecord {
                id,
                data: data.clone(),
            }))
    }

    fn scan(&self, kind: &str, spec: &QuerySpec) -> StoreResult<Vec<StoredRecord>> {
        let inner = self.lock();
        let mut rows: Vec<(i64, Value)> = inner
            .tables
            .get(kind)
            .map(|table| {
                table
                    .iter()
                    .filter(|(_, data)| match &spec.filter {
                        Some(filter) => filter.matches(data),
                        None => true,
                    })
                    .map(|(id, data)| (*id, data.clone()))
                    .collect()
            })
            .unwrap_or_default();
        drop(inner);

        order_rows(&mut rows, spec);

        let offset = spec.offset.unwrap_or(0) as usize;
        let limit = spec.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, data)| StoredRecord { id, data })
            .collect())
    }

    fn commit(&self, kind: &str, batch: StagedBatch) -> StoreResult<CommitReceipt> {
        let mut inner = self.lock();
        let mut working = inner.tables.get(kind).cloned().unwrap_or_default();
        let pointers = inner.unique.get(kind).cloned().unwrap_or_default();
        let mut next_id = inner.next_id;
        let mut receipt = CommitReceipt::default();

        for (temp_id, data) in batch.inserts() {
            next_id += 1;
            check_unique(&working, &pointers, data, next_id)?;
            working.insert(next_id, data.clone());
            receipt.assigned.push((*temp_id, next_id));
        }

        for (id, data) in batch.updates() {
            if !working.contains_key(id) {
                return Err(StoreError::NotFound(format!("{kind}/{id}")));
            }
            check_unique(&working, &pointers, data, *id)?;
            working.insert(*id, data.clone());
        }

        for id in batch.deletes() {
            if working.remove(id).is_none() {
                return Err(StoreError::NotFound(format!("{kind}/{id}")));
            }
        }

        debug!(kind, ops = batch.len(), "memory commit applied");
        inner.tables.insert(kind.to_string(), working);
        inner.next_id = next_id;
        Ok(receipt)
    }
}
