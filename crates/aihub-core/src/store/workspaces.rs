//! Workspace store: workspace entities, their AI-service membership, the
//! capped activity feed, and the "current workspace" pointer.
//!
//! The current pointer is a presentational convenience, not a lock. On
//! load the most recently updated workspace becomes current.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::constants::keys;
use crate::error::HubError;
use crate::models::{Activity, Workspace, WorkspacePatch, WorkspaceSpec};
use crate::seed;
use crate::storage::Storage;
use crate::store::IdentityStore;

struct Inner {
    workspaces: Vec<Workspace>,
    current_id: Option<String>,
}

#[derive(Clone)]
pub struct WorkspaceStore {
    storage: Storage,
    identity: IdentityStore,
    inner: Arc<RwLock<Inner>>,
}

impl WorkspaceStore {
    pub fn new(storage: Storage, identity: IdentityStore) -> Self {
        Self {
            storage,
            identity,
            inner: Arc::new(RwLock::new(Inner {
                workspaces: Vec::new(),
                current_id: None,
            })),
        }
    }

    /// Read the persisted collection. Gated on an authenticated session;
    /// without one nothing loads. First run seeds the demo workspaces.
    pub fn load(&self) {
        if !self.identity.is_authenticated() {
            return;
        }

        match self.storage.get::<Vec<Workspace>>(keys::WORKSPACES) {
            Ok(Some(workspaces)) => {
                let current_id = workspaces
                    .iter()
                    .max_by_key(|ws| ws.updated_at)
                    .map(|ws| ws.id.clone());
                let mut inner = self.inner.write();
                inner.workspaces = workspaces;
                inner.current_id = current_id;
            }
            Ok(None) => {
                let workspaces = seed::demo_workspaces();
                let mut inner = self.inner.write();
                self.persist(&workspaces);
                inner.current_id = workspaces.first().map(|ws| ws.id.clone());
                inner.workspaces = workspaces;
            }
            Err(e) => warn!("failed to load workspaces: {e}"),
        }
    }

    // ===== Query Methods =====

    pub fn workspaces(&self) -> Vec<Workspace> {
        self.inner.read().workspaces.clone()
    }

    pub fn get(&self, id: &str) -> Option<Workspace> {
        self.inner.read().workspaces.iter().find(|ws| ws.id == id).cloned()
    }

    pub fn current(&self) -> Option<Workspace> {
        let inner = self.inner.read();
        let id = inner.current_id.as_deref()?;
        inner.workspaces.iter().find(|ws| ws.id == id).cloned()
    }

    // ===== Mutation Methods =====

    /// Allocate a new workspace from `spec` and make it current.
    pub fn create(&self, spec: WorkspaceSpec) -> Option<Workspace> {
        let workspace = Workspace::create(spec);
        let mut inner = self.inner.write();
        inner.workspaces.push(workspace.clone());
        inner.current_id = Some(workspace.id.clone());
        // Persisting under the write lock keeps the blob's writers
        // serialized; a concurrent mutation cannot land a stale snapshot.
        self.persist(&inner.workspaces);
        Some(workspace)
    }

    /// Merge a typed patch; `updated_at` is always refreshed. Returns false
    /// for an unknown id.
    pub fn update(&self, id: &str, patch: WorkspacePatch) -> bool {
        let mut inner = self.inner.write();
        let Some(workspace) = inner.workspaces.iter_mut().find(|ws| ws.id == id) else {
            debug!("update rejected: {}", HubError::not_found(format!("workspace {id}")));
            return false;
        };
        workspace.apply(patch);
        self.persist(&inner.workspaces);
        true
    }

    /// Remove a workspace. When the current workspace is deleted, the first
    /// remaining one (if any) becomes current.
    pub fn delete(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        inner.workspaces.retain(|ws| ws.id != id);
        if inner.current_id.as_deref() == Some(id) {
            inner.current_id = inner.workspaces.first().map(|ws| ws.id.clone());
        }
        self.persist(&inner.workspaces);
        true
    }

    /// Append to the workspace's activity feed, evicting beyond the cap.
    /// Returns false for an unknown workspace.
    pub fn add_activity(&self, workspace_id: &str, activity: Activity) -> bool {
        let mut inner = self.inner.write();
        let Some(workspace) = inner.workspaces.iter_mut().find(|ws| ws.id == workspace_id) else {
            debug!(
                "activity dropped: {}",
                HubError::not_found(format!("workspace {workspace_id}"))
            );
            return false;
        };
        workspace.push_activity(activity);
        self.persist(&inner.workspaces);
        true
    }

    /// Point the current-workspace selector at `id`. Selecting an unknown
    /// id is a no-op failure.
    pub fn select(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        if !inner.workspaces.iter().any(|ws| ws.id == id) {
            return false;
        }
        inner.current_id = Some(id.to_string());
        true
    }

    fn persist(&self, snapshot: &[Workspace]) {
        if let Err(e) = self.storage.set(keys::WORKSPACES, &snapshot) {
            warn!("failed to persist workspaces: {e}");
        }
    }
}
