//! Identifier types used throughout the WasteTrack core.
//!
//! Entity identity is relational: the store assigns a positive rowid at
//! commit. Before commit, the gateway hands out temporary negative ids so a
//! pending insert can be addressed without identity corruption. Registry
//! registrations use UUID v7 for time-ordered, globally unique identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of a persisted record.
///
/// Positive values are store-assigned rowids and immutable once committed.
/// Negative values are temporary ids assigned by a gateway to entities staged
/// for insert; they never reach the store's data pages and are remapped to
/// real ids by the commit receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Wraps a raw store rowid.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the underlying raw id.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// True for gateway-assigned ids of entities not yet committed.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        self.0 < 0
    }

    /// Parses an entity id from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, crate::Error> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| crate::Error::InvalidEntityId(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unique identifier of one registry registration.
///
/// A fresh `HandleId` is minted every time a resource is registered, so the
/// close-eviction path can tell the registration that actually closed apart
/// from a newer one stored under the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Creates a new handle id with the current timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a handle id from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
