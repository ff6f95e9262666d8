//! Conversation store: per-workspace message threads, the chat service
//! selector, and the simulated AI reply.
//!
//! `send` appends the user message immediately and schedules a synthetic
//! reply on a timer. Each pending reply is a cancellable task keyed by a
//! request id; clearing a thread (or tearing the store down) aborts the
//! replies scheduled for it, so a cleared thread never resurrects a late
//! reply. Reply tasks append through the in-memory state under the write
//! lock and never re-read the persisted blob, so two in-flight sends cannot
//! overwrite each other's writes. The `messages` blob is likewise only
//! written while that lock is held, so the durable snapshot always reflects
//! the latest in-memory state.
//!
//! Expected failures (blank content, no session) surface as `None` plus the
//! UI-visible last-error field, never as an error type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::{keys, AI_REPLY_DELAY_MS, FALLBACK_AI_NAME, REPLY_PREVIEW_CHARS};
use crate::error::HubError;
use crate::models::{Message, Workspace};
use crate::seed;
use crate::storage::Storage;
use crate::store::{IdentityStore, ServiceRegistry};

struct PendingReply {
    workspace_id: String,
    abort: AbortHandle,
}

struct Inner {
    /// Workspace id -> chronological thread (append order = causal order).
    messages: HashMap<String, Vec<Message>>,
    current_service: Option<String>,
    last_error: Option<String>,
    pending_replies: HashMap<String, PendingReply>,
}

#[derive(Clone)]
pub struct ConversationStore {
    storage: Storage,
    identity: IdentityStore,
    registry: ServiceRegistry,
    inner: Arc<RwLock<Inner>>,
}

impl ConversationStore {
    pub fn new(storage: Storage, identity: IdentityStore, registry: ServiceRegistry) -> Self {
        Self {
            storage,
            identity,
            registry,
            inner: Arc::new(RwLock::new(Inner {
                messages: HashMap::new(),
                current_service: None,
                last_error: None,
                pending_replies: HashMap::new(),
            })),
        }
    }

    /// Read persisted threads; first run seeds a demo thread for the active
    /// workspace. The default chat service is the workspace's first service.
    pub fn load(&self, active_workspace: Option<&Workspace>) {
        if self.identity.user().is_none() {
            return;
        }

        match self.storage.get::<HashMap<String, Vec<Message>>>(keys::MESSAGES) {
            Ok(Some(messages)) => self.inner.write().messages = messages,
            Ok(None) => {
                if let Some(ws) = active_workspace {
                    let mut seeded = HashMap::new();
                    seeded.insert(ws.id.clone(), seed::demo_thread(&ws.id));
                    let mut inner = self.inner.write();
                    if let Err(e) = self.persist(&seeded) {
                        warn!("failed to persist seeded thread: {e}");
                    }
                    inner.messages = seeded;
                }
            }
            Err(e) => {
                self.fail(HubError::Storage(e), "Failed to load messages. Please try again.");
            }
        }

        if let Some(service) = active_workspace.and_then(|ws| ws.ai_services.first()) {
            self.inner.write().current_service = Some(service.clone());
        }
    }

    // ===== Query Methods =====

    /// Full thread for a workspace, empty if none exists. Never mutates.
    pub fn messages(&self, workspace_id: &str) -> Vec<Message> {
        self.inner
            .read()
            .messages
            .get(workspace_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn current_service(&self) -> Option<String> {
        self.inner.read().current_service.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    pub fn pending_reply_count(&self) -> usize {
        self.inner.read().pending_replies.len()
    }

    // ===== Mutation Methods =====

    /// Append a user message and schedule the synthetic reply.
    ///
    /// Returns the appended user message, or `None` when the content is
    /// blank, no user is loaded, or the workspace id is empty. Must be
    /// called within a tokio runtime (the reply timer is a spawned task).
    pub fn send(&self, content: &str, workspace_id: &str, service_id: &str) -> Option<Message> {
        let Some(user) = self.identity.user() else {
            self.fail(
                HubError::validation("no user loaded"),
                "No active session. Please sign in.",
            );
            return None;
        };
        if content.trim().is_empty() {
            self.fail(
                HubError::validation("blank message content"),
                "Message content is empty.",
            );
            return None;
        }
        if workspace_id.is_empty() {
            self.fail(
                HubError::validation("missing workspace id"),
                "No workspace selected.",
            );
            return None;
        }
        self.clear_error();

        let message = Message::from_user(content, workspace_id, service_id, &user);

        let mut inner = self.inner.write();
        inner
            .messages
            .entry(workspace_id.to_string())
            .or_default()
            .push(message.clone());

        // Resolve the reply attribution now; the reply itself is minted when
        // the timer fires.
        let (service_name, service_icon) = match self.registry.get(service_id) {
            Some(service) => (service.name, Some(service.icon)),
            None => (FALLBACK_AI_NAME.to_string(), None),
        };
        let reply_content = synthetic_reply_content(&service_name, &message.content);

        let request_id = Uuid::new_v4().to_string();
        let store = self.clone();
        let task = ReplyRequest {
            request_id: request_id.clone(),
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
            service_name,
            service_icon,
            content: reply_content,
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS)).await;
            store.complete_reply(task);
        });
        inner.pending_replies.insert(
            request_id,
            PendingReply {
                workspace_id: workspace_id.to_string(),
                abort: handle.abort_handle(),
            },
        );
        // Persist under the lock: the blob is only ever written by the
        // holder, so a racing reply task cannot land an older snapshot.
        let persisted = self.persist(&inner.messages);
        drop(inner);

        if let Err(e) = persisted {
            self.fail(HubError::Storage(e), "Failed to send message. Please try again.");
        }
        Some(message)
    }

    fn complete_reply(&self, task: ReplyRequest) {
        let mut inner = self.inner.write();
        // A missing entry means the thread was cleared while we slept.
        if inner.pending_replies.remove(&task.request_id).is_none() {
            debug!("dropping cancelled reply for workspace {}", task.workspace_id);
            return;
        }
        let reply = Message::synthetic_reply(
            task.content,
            &task.workspace_id,
            &task.service_id,
            &task.service_name,
            task.service_icon,
        );
        inner
            .messages
            .entry(task.workspace_id)
            .or_default()
            .push(reply);
        let persisted = self.persist(&inner.messages);
        drop(inner);

        if let Err(e) = persisted {
            self.fail(HubError::Storage(e), "Failed to get AI response. Please try again.");
        }
    }

    /// Point the chat selector at a service. The id is not validated
    /// against the registry or its connection state.
    pub fn switch_service(&self, service_id: &str) -> bool {
        let mut inner = self.inner.write();
        inner.current_service = Some(service_id.to_string());
        inner.last_error = None;
        true
    }

    /// Delete a workspace's entire thread and abort its pending replies.
    pub fn clear(&self, workspace_id: &str) -> bool {
        let mut inner = self.inner.write();
        inner.pending_replies.retain(|_, pending| {
            if pending.workspace_id == workspace_id {
                pending.abort.abort();
                false
            } else {
                true
            }
        });
        inner.messages.remove(workspace_id);
        inner.last_error = None;
        let persisted = self.persist(&inner.messages);
        drop(inner);

        if let Err(e) = persisted {
            self.fail(HubError::Storage(e), "Failed to clear chat. Please try again.");
            return false;
        }
        true
    }

    /// Abort every pending reply. Called on store teardown.
    pub fn abort_pending_replies(&self) {
        let mut inner = self.inner.write();
        for pending in inner.pending_replies.values() {
            pending.abort.abort();
        }
        inner.pending_replies.clear();
    }

    pub fn clear_error(&self) {
        self.inner.write().last_error = None;
    }

    /// Record a classified failure in the log and surface the UI-facing
    /// message through the last-error field.
    fn fail(&self, err: HubError, ui_message: &str) {
        match &err {
            HubError::Storage(_) => warn!("conversation store: {err}"),
            _ => debug!("conversation store: {err}"),
        }
        self.inner.write().last_error = Some(ui_message.to_string());
    }

    fn persist(
        &self,
        snapshot: &HashMap<String, Vec<Message>>,
    ) -> Result<(), crate::storage::StorageError> {
        self.storage.set(keys::MESSAGES, snapshot)
    }
}

struct ReplyRequest {
    request_id: String,
    workspace_id: String,
    service_id: String,
    service_name: String,
    service_icon: Option<String>,
    content: String,
}

fn synthetic_reply_content(service_name: &str, prompt: &str) -> String {
    let preview: String = prompt.chars().take(REPLY_PREVIEW_CHARS).collect();
    let ellipsis = if prompt.chars().count() > REPLY_PREVIEW_CHARS {
        "..."
    } else {
        ""
    };
    format!(
        "This is a simulated response from {service_name}. In a real app, this would be \
         generated by the actual AI service based on your message: \"{preview}{ellipsis}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SenderKind;
    use tempfile::tempdir;

    fn make_store(dir: &std::path::Path, authenticated: bool) -> ConversationStore {
        let storage = Storage::new(dir).unwrap();
        let identity = IdentityStore::new(storage.clone(), authenticated);
        identity.load();
        let registry = ServiceRegistry::new(storage.clone());
        registry.load();
        ConversationStore::new(storage, identity, registry)
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_blank_content_returns_none() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        assert!(store.send("   ", "ws-1", "ai-1").is_none());
        assert!(store.messages("ws-1").is_empty());
        assert!(store.last_error().is_some());

        store.clear_error();
        assert!(store.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_without_session_returns_none() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), false);

        assert!(store.send("Hello", "ws-1", "ai-1").is_none());
        assert!(store.messages("ws-1").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_appends_user_message_then_delayed_reply() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        let sent = store.send("Hello", "ws-1", "ai-1").unwrap();
        assert_eq!(sent.content, "Hello");

        let thread = store.messages("ws-1");
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].sender.kind, SenderKind::User);

        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 100)).await;

        let thread = store.messages("ws-1");
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[1].sender.kind, SenderKind::Ai);
        assert_eq!(thread[1].sender.name, "ChatGPT");
        assert!(thread[1].content.contains("\"Hello\""));
        assert_eq!(store.pending_reply_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_echoes_truncated_prefix() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        let long = "x".repeat(60);
        store.send(&long, "ws-1", "ai-1").unwrap();
        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 100)).await;

        let thread = store.messages("ws-1");
        let expected = format!("\"{}...\"", "x".repeat(REPLY_PREVIEW_CHARS));
        assert!(thread[1].content.ends_with(&expected));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_service_uses_fallback_attribution() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        store.send("Hi", "ws-1", "ai-404").unwrap();
        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 100)).await;

        let thread = store.messages("ws-1");
        assert_eq!(thread[1].sender.name, FALLBACK_AI_NAME);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_aborts_pending_reply() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        store.send("Hello", "ws-1", "ai-1").unwrap();
        assert_eq!(store.pending_reply_count(), 1);

        assert!(store.clear("ws-1"));
        assert_eq!(store.pending_reply_count(), 0);

        // The reply must not reappear after the timer would have fired.
        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS * 2)).await;
        assert!(store.messages("ws-1").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_only_affects_one_workspace() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        store.send("To one", "ws-1", "ai-1").unwrap();
        store.send("To two", "ws-2", "ai-1").unwrap();
        store.clear("ws-1");

        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 100)).await;
        assert!(store.messages("ws-1").is_empty());
        assert_eq!(store.messages("ws-2").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_sends_append_in_call_order() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        store.send("first", "ws-1", "ai-1").unwrap();
        store.send("second", "ws-1", "ai-1").unwrap();

        let thread = store.messages("ws-1");
        assert_eq!(thread[0].content, "first");
        assert_eq!(thread[1].content, "second");

        // Both replies land; neither overwrites the other's append.
        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 100)).await;
        let thread = store.messages("ws-1");
        assert_eq!(thread.len(), 4);
        assert_eq!(
            thread.iter().filter(|m| m.sender.kind == SenderKind::Ai).count(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_durable_snapshot_tracks_each_append() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        fn read_blob(dir: &std::path::Path) -> HashMap<String, Vec<Message>> {
            Storage::new(dir).unwrap().get(keys::MESSAGES).unwrap().unwrap()
        }

        store.send("Hello", "ws-1", "ai-1").unwrap();
        assert_eq!(read_blob(dir.path())["ws-1"].len(), 1);

        // The reply append lands in the blob too; it never reverts the
        // snapshot to a pre-send copy.
        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 100)).await;
        let on_disk = read_blob(dir.path());
        assert_eq!(on_disk["ws-1"].len(), 2);
        assert_eq!(on_disk["ws-1"][0].content, "Hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_threads_survive_restart() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        store.send("Hello", "ws-1", "ai-1").unwrap();
        tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 100)).await;
        let before = store.messages("ws-1");

        let restarted = make_store(dir.path(), true);
        restarted.load(None);
        assert_eq!(restarted.messages("ws-1"), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_seeds_demo_thread_for_active_workspace() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        let ws = Workspace::create(crate::models::WorkspaceSpec {
            name: "Demo".to_string(),
            ai_services: vec!["ai-3".to_string()],
            ..Default::default()
        });
        store.load(Some(&ws));

        assert_eq!(store.messages(&ws.id).len(), 3);
        assert_eq!(store.current_service().as_deref(), Some("ai-3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_service_is_unvalidated() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path(), true);

        assert!(store.switch_service("ai-404"));
        assert_eq!(store.current_service().as_deref(), Some("ai-404"));
    }
}
