//! Composable read queries.

use crate::gateway::{join_err, materialize};
use std::marker::PhantomData;
use std::sync::Arc;
use wastetrack_model::Record;
use wastetrack_store::{EntityStore, Filter, QuerySpec, SortDirection, SortKey, StoreResult};

/// A typed query under construction: filters, ordering and a window composed
/// before anything is materialized, then pushed down to the store in one
/// scan. Obtained from [`Gateway::query`](crate::Gateway::query).
pub struct Query<T: Record> {
    store: Arc<dyn EntityStore>,
    spec: QuerySpec,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Record> Query<T> {
    pub(crate) fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            spec: QuerySpec::default(),
            _kind: PhantomData,
        }
    }

    /// Adds a predicate, conjoined with any already present.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.spec.filter = Some(match self.spec.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Appends an ordering key (JSON pointer into the payload).
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.spec.order.push(SortKey {
            field: field.to_string(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.spec.offset = Some(offset);
        self
    }

    /// Materializes the query.
    pub async fn fetch(self) -> StoreResult<Vec<T>> {
        let Query { store, spec, .. } = self;
        let rows = tokio::task::spawn_blocking(move || store.scan(T::KIND, &spec))
            .await
            .map_err(join_err)??;
        rows.into_iter().map(materialize).collect()
    }
}
