//! Resource kinds the registry manages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The singleton resource surfaces of the application. Each kind has at most
/// one live instance at a time; the registry enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Documents,
    Clients,
    Vehicles,
    Users,
    Settings,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Documents,
        ResourceKind::Clients,
        ResourceKind::Vehicles,
        ResourceKind::Users,
        ResourceKind::Settings,
    ];

    /// Human-readable label for window titles and logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Documents => "Disposal documents",
            ResourceKind::Clients => "Clients",
            ResourceKind::Vehicles => "Vehicles",
            ResourceKind::Users => "Users",
            ResourceKind::Settings => "Settings",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            ResourceKind::Documents => "documents",
            ResourceKind::Clients => "clients",
            ResourceKind::Vehicles => "vehicles",
            ResourceKind::Users => "users",
            ResourceKind::Settings => "settings",
        };
        f.write_str(key)
    }
}
