//! Composition root for the state core.
//!
//! Builds the persistence substrate and the five stores in dependency order
//! and runs the gated load sequence: identity first, then the catalog and
//! analytics, and the user-scoped stores only once a session exists. Store
//! handles are explicit injected objects, never ambient statics, so tests
//! can construct isolated instances.

use anyhow::Result;

use crate::api::ApiClient;
use crate::config::CoreConfig;
use crate::storage::Storage;
use crate::store::{
    AnalyticsStore, ConversationStore, IdentityStore, ServiceRegistry, WorkspaceStore,
};

pub struct HubRuntime {
    storage: Storage,
    identity: IdentityStore,
    services: ServiceRegistry,
    workspaces: WorkspaceStore,
    conversations: ConversationStore,
    analytics: AnalyticsStore,
    api: Option<ApiClient>,
}

impl HubRuntime {
    pub fn new(config: CoreConfig) -> Result<Self> {
        let storage = Storage::new(&config.data_dir)?;

        let identity = IdentityStore::new(storage.clone(), config.demo_auto_login);
        let services = ServiceRegistry::new(storage.clone());
        let workspaces = WorkspaceStore::new(storage.clone(), identity.clone());
        let conversations =
            ConversationStore::new(storage.clone(), identity.clone(), services.clone());
        let analytics = AnalyticsStore::new(storage.clone());
        let api = config
            .api_base_url
            .as_deref()
            .map(ApiClient::new)
            .transpose()?;

        Ok(Self {
            storage,
            identity,
            services,
            workspaces,
            conversations,
            analytics,
            api,
        })
    }

    /// Load every store, honoring the identity gate.
    pub fn init(&self) {
        self.identity.load();
        self.services.load();
        self.analytics.load();
        if self.identity.is_authenticated() {
            self.workspaces.load();
            let current = self.workspaces.current();
            self.conversations.load(current.as_ref());
        }
    }

    /// Re-run the user-scoped loads after a login/registration that
    /// happened post-init.
    pub fn load_user_scoped(&self) {
        if self.identity.is_authenticated() {
            self.workspaces.load();
            let current = self.workspaces.current();
            self.conversations.load(current.as_ref());
        }
    }

    pub fn identity(&self) -> IdentityStore {
        self.identity.clone()
    }

    pub fn services(&self) -> ServiceRegistry {
        self.services.clone()
    }

    pub fn workspaces(&self) -> WorkspaceStore {
        self.workspaces.clone()
    }

    pub fn conversations(&self) -> ConversationStore {
        self.conversations.clone()
    }

    pub fn analytics(&self) -> AnalyticsStore {
        self.analytics.clone()
    }

    /// Backend boundary for a future real API; not called by any store.
    pub fn api(&self) -> Option<&ApiClient> {
        self.api.as_ref()
    }

    pub fn storage(&self) -> Storage {
        self.storage.clone()
    }

    /// Abort in-flight reply timers. A dropped runtime without shutdown
    /// leaves orphaned timers running until their tasks complete.
    pub fn shutdown(&self) {
        self.conversations.abort_pending_replies();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_gates_user_scoped_stores() {
        let dir = tempdir().unwrap();
        let runtime = HubRuntime::new(CoreConfig::new(dir.path())).unwrap();
        runtime.init();

        // Fail-closed build: catalog and analytics load, user-scoped don't.
        assert!(!runtime.identity().is_authenticated());
        assert_eq!(runtime.services().services().len(), 4);
        assert!(!runtime.analytics().stats().is_empty());
        assert!(runtime.workspaces().workspaces().is_empty());
    }

    #[test]
    fn test_demo_init_loads_everything() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::new(dir.path()).with_demo_auto_login(true);
        let runtime = HubRuntime::new(config).unwrap();
        runtime.init();

        assert!(runtime.identity().is_authenticated());
        assert_eq!(runtime.workspaces().workspaces().len(), 3);
        let current = runtime.workspaces().current().unwrap();
        assert_eq!(runtime.conversations().messages(&current.id).len(), 3);
        // Default chat service comes from the current workspace.
        assert_eq!(
            runtime.conversations().current_service(),
            current.ai_services.first().cloned()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_then_load_user_scoped() {
        let dir = tempdir().unwrap();
        let runtime = HubRuntime::new(CoreConfig::new(dir.path())).unwrap();
        runtime.init();
        assert!(runtime.workspaces().workspaces().is_empty());

        assert!(runtime.identity().login("sam@example.com", "pw").await);
        runtime.load_user_scoped();
        assert_eq!(runtime.workspaces().workspaces().len(), 3);
    }

    #[test]
    fn test_api_client_follows_config() {
        let dir = tempdir().unwrap();
        let runtime = HubRuntime::new(CoreConfig::new(dir.path())).unwrap();
        assert!(runtime.api().is_none());

        let runtime = HubRuntime::new(
            CoreConfig::new(dir.path()).with_api_base_url("https://api.example.com/v1"),
        )
        .unwrap();
        assert!(runtime.api().is_some());
    }

    #[test]
    fn test_full_state_round_trips_across_restart() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::new(dir.path()).with_demo_auto_login(true);
        let runtime = HubRuntime::new(config.clone()).unwrap();
        runtime.init();

        runtime.services().connect("ai-2");
        let ws = runtime
            .workspaces()
            .create(crate::models::WorkspaceSpec {
                name: "Persisted".to_string(),
                ..Default::default()
            })
            .unwrap();

        let restarted = HubRuntime::new(config).unwrap();
        restarted.init();
        assert_eq!(restarted.identity().user(), runtime.identity().user());
        assert_eq!(restarted.services().services(), runtime.services().services());
        assert_eq!(restarted.workspaces().workspaces(), runtime.workspaces().workspaces());
        assert_eq!(restarted.workspaces().current().unwrap().id, ws.id);
        assert_eq!(restarted.analytics().stats(), runtime.analytics().stats());
    }
}
