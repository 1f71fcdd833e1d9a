//! Single-instance registry over live resources.
//!
//! At most one live instance per [`ResourceKind`]. A repeated open request
//! activates the existing instance instead of building a second one; a
//! closed instance is evicted — either eagerly through its close signal or
//! lazily when the next lookup finds it stale.

use crate::factory::{ConstructionError, ResourceFactory};
use crate::kind::ResourceKind;
use crate::resource::Resource;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};
use wastetrack_types::HandleId;

struct Registered {
    instance: Arc<dyn Resource>,
    /// Identity of this registration. The close signal evicts only the
    /// registration it was installed for, so a late signal from a replaced
    /// instance can never evict its successor.
    handle_id: HandleId,
}

type Registrations = Mutex<HashMap<ResourceKind, Registered>>;

pub struct ResourceRegistry {
    factory: Arc<dyn ResourceFactory>,
    inner: Arc<Registrations>,
}

fn lock(inner: &Registrations) -> std::sync::MutexGuard<'_, HashMap<ResourceKind, Registered>> {
    inner.lock().expect("registry lock poisoned")
}

impl ResourceRegistry {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self {
            factory,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens the resource for `kind`: activates the live instance if one is
    /// registered, otherwise builds, registers and shows a fresh one. A
    /// registered instance that already closed without notice is discarded
    /// first. Construction failure leaves the registry unchanged.
    pub async fn show_or_activate(
        &self,
        kind: ResourceKind,
    ) -> Result<Arc<dyn Resource>, ConstructionError> {
        if let Some(existing) = self.live_instance(kind) {
            debug!(%kind, "activating existing resource");
            existing.activate();
            return Ok(existing);
        }

        // No lock held across construction: building may load data.
        let instance = self.factory.build(kind).await?;

        let mut map = lock(&self.inner);
        // A concurrent open may have won the race while we were building.
        // The duplicate never registered, so it must release whatever its
        // construction allocated before it is dropped.
        if let Some(entry) = map.get(&kind) {
            if !entry.instance.is_closed() {
                let existing = Arc::clone(&entry.instance);
                drop(map);
                debug!(%kind, "closing freshly built duplicate");
                instance.request_close();
                existing.activate();
                return Ok(existing);
            }
        }

        let handle_id = HandleId::new();
        map.insert(
            kind,
            Registered {
                instance: Arc::clone(&instance),
                handle_id,
            },
        );
        drop(map);

        let registrations = Arc::downgrade(&self.inner);
        instance
            .closed_signal()
            .subscribe(Box::new(move || evict(&registrations, kind, handle_id)));

        info!(%kind, %handle_id, "resource registered");
        instance.show();
        Ok(instance)
    }

    /// The live instance for `kind`, if any. A registered instance found
    /// closed is pruned on the way out.
    pub fn get_open(&self, kind: ResourceKind) -> Option<Arc<dyn Resource>> {
        self.live_instance(kind)
    }

    /// Requests close on every live instance and clears the registry.
    /// Instances that already closed are skipped, not errors.
    pub fn close_all(&self) {
        let instances: Vec<Arc<dyn Resource>> = {
            let mut map = lock(&self.inner);
            map.drain()
                .map(|(_, entry)| entry.instance)
                .collect()
        };
        for instance in instances {
            if !instance.is_closed() {
                instance.request_close();
            }
        }
        info!("all resources closed");
    }

    /// Kinds with a live instance registered.
    #[must_use]
    pub fn open_kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| self.live_instance(*kind).is_some())
            .collect()
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open_kinds().len()
    }

    fn live_instance(&self, kind: ResourceKind) -> Option<Arc<dyn Resource>> {
        let mut map = lock(&self.inner);
        match map.get(&kind) {
            Some(entry) if !entry.instance.is_closed() => Some(Arc::clone(&entry.instance)),
            Some(_) => {
                warn!(%kind, "pruning resource that closed without signaling");
                map.remove(&kind);
                None
            }
            None => None,
        }
    }
}

/// Close-signal eviction: removes the registration, but only while it still
/// carries the handle id the signal was installed for.
fn evict(registrations: &Weak<Registrations>, kind: ResourceKind, handle_id: HandleId) {
    let Some(inner) = registrations.upgrade() else {
        return;
    };
    let mut map = lock(&inner);
    match map.get(&kind) {
        Some(entry) if entry.handle_id == handle_id => {
            map.remove(&kind);
            debug!(%kind, %handle_id, "resource evicted on close");
        }
        Some(_) => {
            debug!(%kind, %handle_id, "ignoring close signal from replaced resource");
        }
        None => {}
    }
}
