//! The unit-of-work gateway.

use crate::query::Query;
use crate::state::{StagedState, Tracked};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wastetrack_model::Record;
use wastetrack_store::{
    EntityStore, Filter, QuerySpec, StagedBatch, StoreError, StoreResult, StoredRecord,
};
use wastetrack_types::EntityId;

/// Result of a successful [`Gateway::save`]: temporary ids of committed
/// inserts mapped to their store-assigned identities.
#[derive(Debug, Default, Clone)]
pub struct SaveOutcome {
    pub inserted: HashMap<EntityId, EntityId>,
}

impl SaveOutcome {
    /// The identity assigned to a pending insert, if it was part of this save.
    #[must_use]
    pub fn assigned(&self, temp: EntityId) -> Option<EntityId> {
        self.inserted.get(&temp).copied()
    }
}

/// Typed staged-CRUD surface over a shared entity store.
///
/// One gateway instance is one unit of work: every `add`/`update`/`delete`
/// stages locally, and [`save`](Gateway::save) commits the whole set as one
/// atomic batch. The store is an explicit constructor parameter — gateways
/// whose changes must land together share one store instance, but each save
/// is still an independent transaction.
pub struct Gateway<T: Record> {
    store: Arc<dyn EntityStore>,
    tracked: HashMap<EntityId, Tracked<T>>,
    insert_order: Vec<EntityId>,
    next_temp: i64,
}

/// Deserializes a stored row and stamps the authoritative row identity on it.
pub(crate) fn materialize<T: Record>(rec: StoredRecord) -> StoreResult<T> {
    let mut entity: T = serde_json::from_value(rec.data)?;
    entity.set_id(EntityId::from_raw(rec.id));
    Ok(entity)
}

pub(crate) fn join_err(e: tokio::task::JoinError) -> StoreError {
    StoreError::Task(e.to_string())
}

impl<T: Record> Gateway<T> {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            tracked: HashMap::new(),
            insert_order: Vec::new(),
            next_temp: 0,
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Single-row lookup by identity.
    ///
    /// An id already tracked by this unit of work resolves to the tracked
    /// copy without touching the store or its staging state; a temporary id
    /// resolves only against pending inserts. A freshly loaded entity is
    /// tracked as `Unchanged`.
    pub async fn get_by_id(&mut self, id: EntityId) -> StoreResult<Option<T>> {
        if let Some(entry) = self.tracked.get(&id) {
            return Ok(Some(entry.entity.clone()));
        }
        if id.is_temporary() {
            return Ok(None);
        }

        let store = Arc::clone(&self.store);
        let raw = tokio::task::spawn_blocking(move || store.get(T::KIND, id.raw()))
            .await
            .map_err(join_err)??;
        match raw {
            None => Ok(None),
            Some(rec) => {
                let entity: T = materialize(rec)?;
                self.tracked.insert(
                    id,
                    Tracked {
                        entity: entity.clone(),
                        state: StagedState::Unchanged,
                    },
                );
                Ok(Some(entity))
            }
        }
    }

    /// Full materialized scan of the kind. No pagination — acceptable only
    /// for small tables; list views should prefer [`Gateway::query`].
    pub async fn get_all(&self) -> StoreResult<Vec<T>> {
        self.fetch(QuerySpec::default()).await
    }

    /// Predicate-filtered scan.
    pub async fn find(&self, filter: Filter) -> StoreResult<Vec<T>> {
        self.fetch(QuerySpec::filtered(filter)).await
    }

    async fn fetch(&self, spec: QuerySpec) -> StoreResult<Vec<T>> {
        let store = Arc::clone(&self.store);
        let rows = tokio::task::spawn_blocking(move || store.scan(T::KIND, &spec))
            .await
            .map_err(join_err)??;
        rows.into_iter().map(materialize).collect()
    }

    /// Composable query access for read-heavy views: filter, order and
    /// window before materializing.
    #[must_use]
    pub fn query(&self) -> Query<T> {
        Query::new(Arc::clone(&self.store))
    }

    // ── Staging ──────────────────────────────────────────────────

    /// Stages an entity for insert, assigning it a temporary identity. The
    /// store assigns the real identity at save. Re-adding a tracked pending
    /// insert refreshes its staged values.
    pub fn add(&mut self, entity: &mut T) -> EntityId {
        if let Some(id) = entity.id() {
            if let Some(entry) = self.tracked.get_mut(&id) {
                if entry.state == StagedState::PendingInsert {
                    entry.entity = entity.clone();
                    return id;
                }
            }
        }

        self.next_temp -= 1;
        let id = EntityId::from_raw(self.next_temp);
        entity.set_id(id);
        self.tracked.insert(
            id,
            Tracked {
                entity: entity.clone(),
                state: StagedState::PendingInsert,
            },
        );
        self.insert_order.push(id);
        debug!(kind = T::KIND, %id, "staged insert");
        id
    }

    /// Stages an entity's current field values for update.
    ///
    /// A pending insert keeps its state — it will be persisted once, with
    /// these values, at save; marking it modified would corrupt its
    /// not-yet-assigned identity. A detached entity with a committed id is
    /// attached as modified. An entity with no identity has no row to
    /// update, so the call is a no-op.
    pub fn update(&mut self, entity: &T) {
        let Some(id) = entity.id() else {
            return;
        };
        match self.tracked.get_mut(&id) {
            Some(entry) => match entry.state {
                StagedState::PendingInsert => entry.entity = entity.clone(),
                StagedState::PendingDelete => {}
                _ => {
                    entry.entity = entity.clone();
                    entry.state = StagedState::Modified;
                }
            },
            None if id.is_temporary() => {
                warn!(kind = T::KIND, %id, "update with unknown temporary id ignored");
            }
            None => {
                self.tracked.insert(
                    id,
                    Tracked {
                        entity: entity.clone(),
                        state: StagedState::Modified,
                    },
                );
            }
        }
    }

    /// Stages an entity for delete. A pending insert is simply dropped from
    /// the staging set — the store never sees it.
    pub fn delete(&mut self, entity: &T) {
        let Some(id) = entity.id() else {
            return;
        };
        match self.tracked.get_mut(&id) {
            Some(entry) if entry.state == StagedState::PendingInsert => {
                self.tracked.remove(&id);
                self.insert_order.retain(|temp| *temp != id);
                debug!(kind = T::KIND, %id, "dropped pending insert");
            }
            Some(entry) => entry.state = StagedState::PendingDelete,
            None if id.is_temporary() => {}
            None => {
                self.tracked.insert(
                    id,
                    Tracked {
                        entity: entity.clone(),
                        state: StagedState::PendingDelete,
                    },
                );
            }
        }
    }

    // ── Commit boundary ──────────────────────────────────────────

    /// Commits every staged operation of this unit of work as one atomic
    /// batch. On success all committed entities reset — inserts become
    /// `Unchanged` under their assigned identity, modifications become
    /// `Unchanged`, deletes detach. On failure nothing is applied, the
    /// staging set is left intact for retry, and the store error surfaces
    /// verbatim.
    pub async fn save(&mut self) -> StoreResult<SaveOutcome> {
        let mut batch = StagedBatch::new();
        for temp in &self.insert_order {
            if let Some(entry) = self.tracked.get(temp) {
                batch.stage_insert(temp.raw(), serde_json::to_value(&entry.entity)?);
            }
        }
        for (id, entry) in &self.tracked {
            match entry.state {
                StagedState::Modified => {
                    batch.stage_update(id.raw(), serde_json::to_value(&entry.entity)?);
                }
                StagedState::PendingDelete if !id.is_temporary() => {
                    batch.stage_delete(id.raw());
                }
                _ => {}
            }
        }

        if batch.is_empty() {
            return Ok(SaveOutcome::default());
        }

        let ops = batch.len();
        let store = Arc::clone(&self.store);
        let receipt = tokio::task::spawn_blocking(move || store.commit(T::KIND, batch))
            .await
            .map_err(join_err)??;

        let mut outcome = SaveOutcome::default();
        for (temp_raw, assigned_raw) in &receipt.assigned {
            let temp = EntityId::from_raw(*temp_raw);
            let assigned = EntityId::from_raw(*assigned_raw);
            if let Some(mut entry) = self.tracked.remove(&temp) {
                entry.entity.set_id(assigned);
                entry.state = StagedState::Unchanged;
                self.tracked.insert(assigned, entry);
            }
            outcome.inserted.insert(temp, assigned);
        }
        self.insert_order.clear();
        self.tracked
            .retain(|_, entry| entry.state != StagedState::PendingDelete);
        for entry in self.tracked.values_mut() {
            if entry.state == StagedState::Modified {
                entry.state = StagedState::Unchanged;
            }
        }

        info!(kind = T::KIND, ops, "unit of work committed");
        Ok(outcome)
    }

    // ── Introspection ────────────────────────────────────────────

    /// Staging state of an identity within this unit of work.
    #[must_use]
    pub fn tracked_state(&self, id: EntityId) -> StagedState {
        self.tracked
            .get(&id)
            .map_or(StagedState::Detached, |entry| entry.state)
    }

    /// Number of entities this unit of work is tracking.
    #[must_use]
    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }
}
