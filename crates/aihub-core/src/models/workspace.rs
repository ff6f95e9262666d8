use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;
use crate::constants::RECENT_ACTIVITY_CAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Message,
    File,
    Update,
    Join,
}

/// A single entry in a workspace's activity feed. Immutable once created;
/// append only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_service: Option<String>,
}

impl Activity {
    pub fn new(kind: ActivityKind, content: impl Into<String>) -> Self {
        Self {
            id: format!("act-{}", Uuid::new_v4()),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
            user: None,
            ai_service: None,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_ai_service(mut self, service_id: impl Into<String>) -> Self {
        self.ai_service = Some(service_id.into());
        self
    }
}

/// A named project container grouping a conversation thread, a set of
/// AI-service references, and a bounded activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_team: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<User>>,
    /// Ids of associated AI services (weak references into the registry).
    pub ai_services: Vec<String>,
    /// Capped ring, oldest-first, most-recent-last.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_activity: Option<Vec<Activity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Workspace {
    pub fn create(spec: WorkspaceSpec) -> Self {
        let now = Utc::now();
        Self {
            id: format!("ws-{}", Uuid::new_v4()),
            name: spec.name,
            description: spec.description,
            created_at: now,
            updated_at: now,
            is_team: spec.is_team,
            members: spec.members,
            ai_services: spec.ai_services,
            recent_activity: None,
            icon: spec.icon,
        }
    }

    /// Merge a patch and refresh `updated_at`.
    pub fn apply(&mut self, patch: WorkspacePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(is_team) = patch.is_team {
            self.is_team = is_team;
        }
        if let Some(members) = patch.members {
            self.members = Some(members);
        }
        if let Some(ai_services) = patch.ai_services {
            self.ai_services = ai_services;
        }
        if let Some(icon) = patch.icon {
            self.icon = Some(icon);
        }
        self.touch();
    }

    /// Append an activity, evicting beyond the cap, and refresh `updated_at`.
    pub fn push_activity(&mut self, activity: Activity) {
        let feed = self.recent_activity.get_or_insert_with(Vec::new);
        feed.push(activity);
        if feed.len() > RECENT_ACTIVITY_CAP {
            let excess = feed.len() - RECENT_ACTIVITY_CAP;
            feed.drain(..excess);
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        let now = Utc::now();
        // updated_at never moves backwards, even across clock adjustment.
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Input for workspace creation; id and timestamps are allocated by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_team: bool,
    #[serde(default)]
    pub members: Option<Vec<User>>,
    #[serde(default)]
    pub ai_services: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Typed partial update. Absent fields are left untouched; unknown fields
/// are rejected at deserialization time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspacePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_team: Option<bool>,
    pub members: Option<Vec<User>>,
    pub ai_services: Option<Vec<String>>,
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> WorkspaceSpec {
        WorkspaceSpec {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_sets_equal_timestamps() {
        let ws = Workspace::create(spec("Demo"));
        assert_eq!(ws.created_at, ws.updated_at);
        assert!(ws.id.starts_with("ws-"));
    }

    #[test]
    fn test_apply_refreshes_updated_at() {
        let mut ws = Workspace::create(spec("Demo"));
        let created = ws.created_at;
        ws.apply(WorkspacePatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        });
        assert_eq!(ws.name, "Renamed");
        assert!(ws.updated_at >= created);
    }

    #[test]
    fn test_activity_ring_evicts_oldest() {
        let mut ws = Workspace::create(spec("Demo"));
        for i in 0..11 {
            ws.push_activity(Activity::new(ActivityKind::Update, format!("a{i}")));
        }
        let feed = ws.recent_activity.as_ref().unwrap();
        assert_eq!(feed.len(), RECENT_ACTIVITY_CAP);
        assert_eq!(feed.first().unwrap().content, "a1");
        assert_eq!(feed.last().unwrap().content, "a10");
    }

    #[test]
    fn test_activity_serializes_type_field() {
        let act = Activity::new(ActivityKind::Join, "joined");
        let json = serde_json::to_value(&act).unwrap();
        assert_eq!(json["type"], "join");
    }
}
