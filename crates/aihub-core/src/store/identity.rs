//! Identity store: owns the current session user and gates whether the
//! user-scoped stores (workspaces, conversations) may load.
//!
//! Mutators persist before returning, but a failed durable write is logged
//! and swallowed without rolling back the in-memory change. The worst case
//! is a session that silently lags on disk until the next successful write.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::constants::{keys, LOGIN_DELAY_MS, REGISTER_DELAY_MS};
use crate::models::{User, UserPatch};
use crate::seed;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unloaded,
    Loading,
    Authenticated,
    Unauthenticated,
}

struct Inner {
    state: AuthState,
    user: Option<User>,
}

/// Cheap-to-clone handle; all clones share one session.
#[derive(Clone)]
pub struct IdentityStore {
    storage: Storage,
    demo_auto_login: bool,
    inner: Arc<RwLock<Inner>>,
}

impl IdentityStore {
    pub fn new(storage: Storage, demo_auto_login: bool) -> Self {
        Self {
            storage,
            demo_auto_login,
            inner: Arc::new(RwLock::new(Inner {
                state: AuthState::Unloaded,
                user: None,
            })),
        }
    }

    // ===== Query Methods =====

    pub fn state(&self) -> AuthState {
        self.inner.read().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    /// Snapshot of the current user, if any.
    pub fn user(&self) -> Option<User> {
        self.inner.read().user.clone()
    }

    // ===== Lifecycle =====

    /// Read the persisted session. With no session on disk, either mint the
    /// demo session (demo builds) or fail closed to `Unauthenticated`.
    pub fn load(&self) {
        self.inner.write().state = AuthState::Loading;

        match self.storage.get::<User>(keys::USER) {
            Ok(Some(user)) => {
                let mut inner = self.inner.write();
                inner.user = Some(user);
                inner.state = AuthState::Authenticated;
            }
            Ok(None) if self.demo_auto_login => {
                let user = seed::demo_user();
                let mut inner = self.inner.write();
                if let Err(e) = self.storage.set(keys::USER, &user) {
                    warn!("failed to persist demo session: {e}");
                }
                info!("no persisted session, auto-created demo session");
                inner.user = Some(user);
                inner.state = AuthState::Authenticated;
            }
            Ok(None) => {
                self.inner.write().state = AuthState::Unauthenticated;
            }
            Err(e) => {
                warn!("failed to load session: {e}");
                self.inner.write().state = AuthState::Unauthenticated;
            }
        }
    }

    // ===== Mutation Methods =====

    /// Demo login: any non-empty credential pair succeeds after a simulated
    /// round trip. The password is never checked against anything.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        if email.trim().is_empty() || password.is_empty() {
            return false;
        }

        self.inner.write().state = AuthState::Loading;
        tokio::time::sleep(Duration::from_millis(LOGIN_DELAY_MS)).await;

        let user = User {
            email: email.trim().to_string(),
            ..seed::demo_user()
        };
        // The session blob is only written while the write lock is held.
        let mut inner = self.inner.write();
        if let Err(e) = self.storage.set(keys::USER, &user) {
            warn!("failed to persist session after login: {e}");
        }
        inner.user = Some(user);
        inner.state = AuthState::Authenticated;
        true
    }

    pub async fn register(&self, name: &str, email: &str, password: &str, is_student: bool) -> bool {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return false;
        }

        self.inner.write().state = AuthState::Loading;
        tokio::time::sleep(Duration::from_millis(REGISTER_DELAY_MS)).await;

        let user = User::register(name.trim(), email.trim(), is_student);
        let mut inner = self.inner.write();
        if let Err(e) = self.storage.set(keys::USER, &user) {
            warn!("failed to persist session after registration: {e}");
        }
        inner.user = Some(user);
        inner.state = AuthState::Authenticated;
        true
    }

    pub fn logout(&self) {
        let mut inner = self.inner.write();
        if let Err(e) = self.storage.remove(keys::USER) {
            warn!("failed to clear persisted session: {e}");
        }
        inner.user = None;
        inner.state = AuthState::Unauthenticated;
    }

    /// Merge profile fields into the current user. Returns false when no
    /// user is loaded.
    pub fn update_profile(&self, patch: UserPatch) -> bool {
        let mut inner = self.inner.write();
        let Some(user) = inner.user.as_mut() else {
            return false;
        };
        user.apply(patch);
        if let Err(e) = self.storage.set(keys::USER, user) {
            warn!("failed to persist profile update: {e}");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &std::path::Path, demo: bool) -> IdentityStore {
        IdentityStore::new(Storage::new(dir).unwrap(), demo)
    }

    #[test]
    fn test_load_without_session_fails_closed() {
        let dir = tempdir().unwrap();
        let identity = store(dir.path(), false);

        assert_eq!(identity.state(), AuthState::Unloaded);
        identity.load();
        assert_eq!(identity.state(), AuthState::Unauthenticated);
        assert!(identity.user().is_none());
    }

    #[test]
    fn test_demo_auto_login_creates_and_persists_session() {
        let dir = tempdir().unwrap();
        let identity = store(dir.path(), true);
        identity.load();

        assert!(identity.is_authenticated());
        let user = identity.user().unwrap();
        assert_eq!(user.id, "user-1");

        // Restart sees the persisted session even with auto-login off.
        let restarted = store(dir.path(), false);
        restarted.load();
        assert!(restarted.is_authenticated());
        assert_eq!(restarted.user().unwrap(), user);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_rejects_empty_credentials() {
        let dir = tempdir().unwrap();
        let identity = store(dir.path(), false);

        assert!(!identity.login("", "hunter2").await);
        assert!(!identity.login("a@example.com", "").await);
        assert!(!identity.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_replaces_session_with_given_email() {
        let dir = tempdir().unwrap();
        let identity = store(dir.path(), false);

        assert!(identity.login("sam@example.com", "anything").await);
        assert!(identity.is_authenticated());
        assert_eq!(identity.user().unwrap().email, "sam@example.com");
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_then_logout_clears_session() {
        let dir = tempdir().unwrap();
        let identity = store(dir.path(), false);

        assert!(identity.register("Sam", "sam@example.com", "pw", true).await);
        let user = identity.user().unwrap();
        assert!(user.id.starts_with("user-"));
        assert!(user.student_verified);

        identity.logout();
        assert_eq!(identity.state(), AuthState::Unauthenticated);

        // Persisted session is gone too.
        let restarted = store(dir.path(), false);
        restarted.load();
        assert_eq!(restarted.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_update_profile_requires_user() {
        let dir = tempdir().unwrap();
        let identity = store(dir.path(), false);

        assert!(!identity.update_profile(UserPatch::default()));

        let identity = store(dir.path(), true);
        identity.load();
        assert!(identity.update_profile(UserPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        }));
        assert_eq!(identity.user().unwrap().name, "Renamed");
    }
}
