//! Service registry: the catalog of AI-service connections.
//!
//! The catalog is seeded once and mutated in place; connect/disconnect are
//! idempotent, and unknown ids are deliberately non-strict (the operation
//! still reports success, with a warn so the looseness is observable).
//! Every mutation persists the full catalog snapshot, not a delta.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::constants::keys;
use crate::models::AiService;
use crate::seed;
use crate::storage::Storage;

#[derive(Clone)]
pub struct ServiceRegistry {
    storage: Storage,
    inner: Arc<RwLock<Vec<AiService>>>,
}

impl ServiceRegistry {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Read the persisted catalog, seeding the fixed demo catalog on first
    /// run. A corrupt blob leaves the catalog empty rather than clobbering
    /// the persisted copy.
    pub fn load(&self) {
        match self.storage.get::<Vec<AiService>>(keys::AI_SERVICES) {
            Ok(Some(catalog)) => *self.inner.write() = catalog,
            Ok(None) => {
                let catalog = seed::service_catalog();
                let mut inner = self.inner.write();
                self.persist(&catalog);
                *inner = catalog;
            }
            Err(e) => warn!("failed to load service catalog: {e}"),
        }
    }

    // ===== Query Methods =====

    pub fn services(&self) -> Vec<AiService> {
        self.inner.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<AiService> {
        self.inner.read().iter().find(|s| s.id == id).cloned()
    }

    pub fn connected(&self) -> Vec<AiService> {
        self.inner
            .read()
            .iter()
            .filter(|s| s.is_connected)
            .cloned()
            .collect()
    }

    // ===== Mutation Methods =====

    pub fn connect(&self, id: &str) -> bool {
        self.set_connected(id, true)
    }

    pub fn disconnect(&self, id: &str) -> bool {
        self.set_connected(id, false)
    }

    fn set_connected(&self, id: &str, connected: bool) -> bool {
        let mut inner = self.inner.write();
        match inner.iter_mut().find(|s| s.id == id) {
            Some(service) => service.is_connected = connected,
            None => warn!("set_connected on unknown service id {id}"),
        }
        // Persist under the write lock so catalog writers stay serialized.
        self.persist(&inner);
        true
    }

    /// Overwrite a service's remaining quota. Clamping against the limit is
    /// the caller's responsibility (`AiService::usage_exceeded`).
    pub fn update_usage(&self, id: &str, remaining: u64) -> bool {
        let mut inner = self.inner.write();
        match inner.iter_mut().find(|s| s.id == id) {
            Some(service) => service.usage_remaining = Some(remaining),
            None => warn!("update_usage on unknown service id {id}"),
        }
        self.persist(&inner);
        true
    }

    fn persist(&self, snapshot: &[AiService]) {
        if let Err(e) = self.storage.set(keys::AI_SERVICES, &snapshot) {
            warn!("failed to persist service catalog: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registry(dir: &std::path::Path) -> ServiceRegistry {
        let registry = ServiceRegistry::new(Storage::new(dir).unwrap());
        registry.load();
        registry
    }

    #[test]
    fn test_load_seeds_fixed_catalog_once() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());
        assert_eq!(registry.services().len(), 4);

        // Mutations survive a reload; the seed is not re-applied.
        registry.connect("ai-2");
        let reloaded = ServiceRegistry::new(Storage::new(dir.path()).unwrap());
        reloaded.load();
        assert!(reloaded.get("ai-2").unwrap().is_connected);
    }

    #[test]
    fn test_connect_is_idempotent() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        assert!(registry.connect("ai-2"));
        let after_once = registry.services();
        assert!(registry.connect("ai-2"));
        assert_eq!(registry.services(), after_once);
    }

    #[test]
    fn test_unknown_id_is_noop_success() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let before = registry.services();
        assert!(registry.connect("ai-404"));
        assert!(registry.disconnect("ai-404"));
        assert!(registry.update_usage("ai-404", 1));
        assert_eq!(registry.services(), before);
    }

    #[test]
    fn test_update_usage_does_not_clamp() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        assert!(registry.update_usage("ai-1", 9_999));
        let service = registry.get("ai-1").unwrap();
        assert_eq!(service.usage_remaining, Some(9_999));
        assert!(service.usage_exceeded());
    }

    #[test]
    fn test_connected_filter() {
        let dir = tempdir().unwrap();
        let registry = registry(dir.path());

        let connected: Vec<_> = registry.connected().iter().map(|s| s.id.clone()).collect();
        assert_eq!(connected, vec!["ai-1".to_string(), "ai-3".to_string()]);
    }
}
