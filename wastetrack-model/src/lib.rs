//! Domain record model for WasteTrack.
//!
//! Defines the types the persistence gateway operates on:
//! - [`Record`] — the bound every persistable type satisfies: serializable,
//!   clonable, with an accessible optional identity field and a stable kind key
//! - The plain records the application tracks: [`DisposalDocument`],
//!   [`Client`], [`Vehicle`], [`AppUser`]
//!
//! Records reference each other by [`EntityId`] only. Foreign keys are
//! resolved on demand by whoever needs the related row; nothing here embeds
//! ownership or validates referential integrity.

mod record;
mod records;

pub use record::Record;
pub use records::{AppUser, Client, DisposalDocument, Vehicle};

pub use wastetrack_types::EntityId;
