use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Openai,
    Anthropic,
    Google,
    Deepseek,
    Other,
}

/// Catalog entry for a third-party AI provider account. Entries are seeded
/// once and mutated in place; they are never deleted. Referenced by id
/// (weak reference) from workspaces and messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiService {
    pub id: String,
    pub name: String,
    pub provider: Provider,
    pub icon: String,
    pub is_connected: bool,
    pub description: String,
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_remaining: Option<u64>,
}

impl AiService {
    /// True when both quota fields are present and remaining exceeds the
    /// limit. The registry does not enforce the clamp; callers check here.
    pub fn usage_exceeded(&self) -> bool {
        match (self.usage_limit, self.usage_remaining) {
            (Some(limit), Some(remaining)) => remaining > limit,
            _ => false,
        }
    }
}
