//! Entity store for WasteTrack.
//!
//! Persistent backing for generic records, stored as JSON blobs keyed by a
//! kind discriminator with identity in a row column. The store exposes three
//! primitives — keyed lookup, spec-driven scans, and an atomic staged commit —
//! and two backends:
//!
//! - [`MemoryStore`] — in-process tables, used by tests and offline tooling
//! - [`SqliteStore`] — rusqlite-backed, one `records` table, commits inside a
//!   single transaction
//!
//! Staging is session-scoped: a [`StagedBatch`] is built by one caller and
//! submitted whole; [`EntityStore::commit`] applies every staged operation or
//! none of them.

mod error;
mod filter;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use filter::{compare_values, Filter, QuerySpec, SortDirection, SortKey};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde_json::Value;

/// A row as the store hands it out: the assigned id plus the JSON payload.
/// Identity lives in the id column, never inside `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub data: Value,
}

/// One unit of work's staged operations, applied atomically by
/// [`EntityStore::commit`]. Inserts are correlated by the caller's temporary
/// id, which the [`CommitReceipt`] maps to the assigned rowid.
#[derive(Debug, Default)]
pub struct StagedBatch {
    inserts: Vec<(i64, Value)>,
    updates: Vec<(i64, Value)>,
    deletes: Vec<i64>,
}

impl StagedBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an insert under a caller-chosen temporary id.
    pub fn stage_insert(&mut self, temp_id: i64, data: Value) {
        self.inserts.push((temp_id, data));
    }

    /// Stages a full-row update of an existing record.
    pub fn stage_update(&mut self, id: i64, data: Value) {
        self.updates.push((id, data));
    }

    /// Stages a delete of an existing record.
    pub fn stage_delete(&mut self, id: i64) {
        self.deletes.push(id);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Number of staged operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }

    #[must_use]
    pub fn inserts(&self) -> &[(i64, Value)] {
        &self.inserts
    }

    #[must_use]
    pub fn updates(&self) -> &[(i64, Value)] {
        &self.updates
    }

    #[must_use]
    pub fn deletes(&self) -> &[i64] {
        &self.deletes
    }
}

/// Result of a successful commit: temporary insert ids mapped to the rowids
/// the store assigned.
#[derive(Debug, Default, Clone)]
pub struct CommitReceipt {
    pub assigned: Vec<(i64, i64)>,
}

/// Contract every backing store satisfies.
///
/// Implementations are internally synchronized; callers that must not block
/// an async context wrap these calls in `spawn_blocking`.
pub trait EntityStore: Send + Sync {
    /// Single-row lookup by kind and id.
    fn get(&self, kind: &str, id: i64) -> StoreResult<Option<StoredRecord>>;

    /// Scans a kind's rows, applying the spec's filter, ordering, limit and
    /// offset. An empty table yields an empty vector.
    fn scan(&self, kind: &str, spec: &QuerySpec) -> StoreResult<Vec<StoredRecord>>;

    /// Applies a staged batch as one atomic unit. On any failure — missing
    /// row, constraint violation, connectivity — nothing is applied and the
    /// error surfaces verbatim.
    fn commit(&self, kind: &str, batch: StagedBatch) -> StoreResult<CommitReceipt>;

    /// Full materialized scan of a kind.
    fn scan_all(&self, kind: &str) -> StoreResult<Vec<StoredRecord>> {
        self.scan(kind, &QuerySpec::default())
    }

    /// Predicate-filtered scan of a kind.
    fn scan_filtered(&self, kind: &str, filter: Filter) -> StoreResult<Vec<StoredRecord>> {
        self.scan(kind, &QuerySpec::filtered(filter))
    }
}
