//! Generic persistence gateway for WasteTrack.
//!
//! A [`Gateway`] wraps a shared entity store with a typed, staged CRUD
//! surface: one gateway instance is one unit of work, and [`Gateway::save`]
//! is its single commit boundary. Tracked entities carry an explicit
//! [`StagedState`] so an update can never corrupt an entity that has not
//! been committed yet.
//!
//! Read-heavy list views use [`Query`] for composable filtered reads and
//! [`ViewQuery`] for the superseding-query rule: only the most recently
//! issued load may be applied to a view; stale completions are discarded.

mod gateway;
mod query;
mod state;
mod view;

pub use gateway::{Gateway, SaveOutcome};
pub use query::Query;
pub use state::StagedState;
pub use view::{LoadOutcome, ViewQuery};
