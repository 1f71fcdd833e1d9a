use serde::de::DeserializeOwned;
use serde::Serialize;
use wastetrack_types::EntityId;

/// Bound satisfied by every type the persistence gateway can track.
///
/// A record's payload is persisted as a JSON blob under its [`KIND`] key; the
/// row id column is the authoritative identity, which is why implementations
/// mark their id field `#[serde(skip)]`. An id of `None` means the record has
/// never been staged; a temporary (negative) id means it is staged for insert
/// but not yet committed.
///
/// [`KIND`]: Record::KIND
pub trait Record: Clone + Serialize + DeserializeOwned + Send + 'static {
    /// Stable kind key, used as the store's table discriminator.
    const KIND: &'static str;

    /// Current identity, if any.
    fn id(&self) -> Option<EntityId>;

    /// Sets the identity. Called by the gateway when assigning a temporary id
    /// and by the store loader when materializing a row.
    fn set_id(&mut self, id: EntityId);
}
