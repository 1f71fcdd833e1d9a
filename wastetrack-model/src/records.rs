//! The record types the desktop application tracks.
//!
//! These are deliberately plain: no validation, no FK resolution, no derived
//! state. The gateway treats them uniformly through the [`Record`] trait.

use crate::Record;
use serde::{Deserialize, Serialize};
use wastetrack_types::EntityId;

/// A waste-disposal document (transfer card).
///
/// `client_id` and `vehicle_id` reference their rows by id only; the related
/// records are loaded on demand through their own gateways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposalDocument {
    #[serde(skip)]
    pub id: Option<EntityId>,
    /// Document number as printed, e.g. "KPO/2024/00131".
    pub number: String,
    /// Issue date, ISO 8601 calendar date.
    pub issued_on: String,
    pub client_id: Option<EntityId>,
    pub vehicle_id: Option<EntityId>,
    /// Waste classification code, e.g. "15 01 06".
    pub waste_code: String,
    pub mass_kg: f64,
}

impl Record for DisposalDocument {
    const KIND: &'static str = "disposal_document";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// A client the documents are issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(skip)]
    pub id: Option<EntityId>,
    pub name: String,
    pub tax_id: String,
    pub address: String,
}

impl Record for Client {
    const KIND: &'static str = "client";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// A vehicle that carries out a disposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(skip)]
    pub id: Option<EntityId>,
    pub registration: String,
    pub capacity_kg: f64,
}

impl Record for Vehicle {
    const KIND: &'static str = "vehicle";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// An application user. Credential material lives outside this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUser {
    #[serde(skip)]
    pub id: Option<EntityId>,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
}

impl Record for AppUser {
    const KIND: &'static str = "app_user";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}
