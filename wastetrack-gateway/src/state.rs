//! Per-entity staging state.

/// The pending-commit status of a tracked entity.
///
/// Transitions (driven by the gateway):
/// `Detached --add--> PendingInsert --save--> Unchanged`;
/// `Unchanged --update--> Modified --save--> Unchanged`;
/// `{Unchanged, Modified, PendingInsert} --delete--> PendingDelete --save-->
/// Detached`. Nothing leaves `PendingDelete` except a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedState {
    /// Not tracked by this unit of work.
    Detached,
    /// Staged for insert; identity is temporary until commit.
    PendingInsert,
    /// Tracked and identical to the stored row.
    Unchanged,
    /// Tracked with local changes staged for update.
    Modified,
    /// Staged for delete.
    PendingDelete,
}

/// A tracked entity plus its staging state.
#[derive(Debug, Clone)]
pub(crate) struct Tracked<T> {
    pub entity: T,
    pub state: StagedState,
}
