//! Core identifier types for the WasteTrack engine.
//!
//! This crate defines the fundamental identifiers shared by the storage,
//! gateway and registry layers:
//! - [`EntityId`] — relational row identity, assigned by the entity store at
//!   commit time, with temporary negative ids for not-yet-committed records
//! - [`HandleId`] — UUID v7 identity of a single registry registration
//!
//! Domain-specific record types (documents, clients, vehicles, users) belong
//! in `wastetrack-model`, not here.

mod ids;

pub use ids::{EntityId, HandleId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),
}
