//! Latest-only query application for list views.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;
use wastetrack_store::StoreResult;

/// How a load ended: applied to the view, or superseded by a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Superseded,
}

/// The observable row set of one logical list view.
///
/// Issuing a new load supersedes any load still in flight for this view:
/// only the most recently issued load's completion is applied, and a stale
/// completion — successful or failed — is silently discarded. Cancellation
/// is scoped to this view; loads on other views are unaffected.
pub struct ViewQuery<T> {
    seq: AtomicU64,
    rows: Mutex<Vec<T>>,
}

impl<T: Clone> ViewQuery<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// The rows most recently applied to this view.
    #[must_use]
    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().expect("view rows lock poisoned").clone()
    }

    /// Issues a load. The ticket is taken when the call starts, so a load
    /// issued later always wins regardless of completion order. A superseded
    /// completion never surfaces its result or its error.
    pub async fn load<F>(&self, query: F) -> StoreResult<LoadOutcome>
    where
        F: Future<Output = StoreResult<Vec<T>>>,
    {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = query.await;
        if self.seq.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding superseded load completion");
            return Ok(LoadOutcome::Superseded);
        }
        let fresh = result?;
        *self.rows.lock().expect("view rows lock poisoned") = fresh;
        Ok(LoadOutcome::Applied)
    }
}

impl<T: Clone> Default for ViewQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}
