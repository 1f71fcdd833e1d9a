//! Single-instance resource registry for WasteTrack.
//!
//! The desktop application opens at most one surface per [`ResourceKind`]:
//! asking for one that is already open activates it instead of building a
//! duplicate. Eviction is identity-checked through a per-registration
//! [`HandleId`](wastetrack_types::HandleId), so a close notification that
//! arrives after the instance was already replaced cannot evict the
//! replacement.

mod factory;
mod kind;
mod registry;
mod resource;

pub use factory::{ConstructionError, ResourceFactory};
pub use kind::ResourceKind;
pub use registry::ResourceRegistry;
pub use resource::{ClosedSignal, Resource};
