//! Resource construction seam.

use crate::kind::ResourceKind;
use crate::resource::Resource;
use async_trait::async_trait;
use std::sync::Arc;

/// A resource could not be built.
#[derive(Debug, thiserror::Error)]
#[error("failed to build {kind} resource: {message}")]
pub struct ConstructionError {
    pub kind: ResourceKind,
    pub message: String,
}

impl ConstructionError {
    pub fn new(kind: ResourceKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Builds resource instances on demand. Construction may load data or talk
/// to the store, so it is async; the registry holds no lock across it.
#[async_trait]
pub trait ResourceFactory: Send + Sync {
    async fn build(&self, kind: ResourceKind) -> Result<Arc<dyn Resource>, ConstructionError>;
}
