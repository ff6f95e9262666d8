use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SenderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Document,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// One entry in a workspace thread. Append-only; never mutated after
/// creation. Thread order is append order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_service: Option<String>,
    pub workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl Message {
    /// Build a user-authored message from trimmed content.
    pub fn from_user(content: &str, workspace_id: &str, ai_service: &str, user: &User) -> Self {
        Self {
            id: format!("msg-{}", Uuid::new_v4()),
            content: content.trim().to_string(),
            timestamp: Utc::now(),
            sender: Sender {
                id: user.id.clone(),
                name: user.name.clone(),
                kind: SenderKind::User,
                avatar: user.avatar.clone(),
            },
            ai_service: Some(ai_service.to_string()),
            workspace_id: workspace_id.to_string(),
            attachments: None,
        }
    }

    /// Build a synthetic AI reply attributed to a service.
    pub fn synthetic_reply(
        content: String,
        workspace_id: &str,
        service_id: &str,
        service_name: &str,
        service_icon: Option<String>,
    ) -> Self {
        Self {
            id: format!("msg-{}", Uuid::new_v4()),
            content,
            timestamp: Utc::now(),
            sender: Sender {
                id: service_id.to_string(),
                name: service_name.to_string(),
                kind: SenderKind::Ai,
                avatar: service_icon,
            },
            ai_service: Some(service_id.to_string()),
            workspace_id: workspace_id.to_string(),
            attachments: None,
        }
    }
}
