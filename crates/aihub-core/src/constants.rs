//! Application-wide constants
//!
//! Centralized location for magic strings and configuration values
//! that are used across multiple modules.

/// Maximum number of activities retained per workspace (oldest evicted).
pub const RECENT_ACTIVITY_CAP: usize = 10;

/// Simulated round-trip delay for login, in milliseconds.
pub const LOGIN_DELAY_MS: u64 = 1_000;

/// Simulated round-trip delay for registration, in milliseconds.
pub const REGISTER_DELAY_MS: u64 = 1_500;

/// Delay before the synthetic AI reply is appended, in milliseconds.
pub const AI_REPLY_DELAY_MS: u64 = 1_500;

/// Number of characters of the prompt echoed back in a synthetic reply.
pub const REPLY_PREVIEW_CHARS: usize = 50;

/// Sender name used for replies attributed to an unknown service id.
pub const FALLBACK_AI_NAME: &str = "AI Assistant";

/// Logical keys in the persistence substrate. One JSON blob per key; each
/// store owns a disjoint subset by convention.
pub mod keys {
    /// Current session user (Identity Store)
    pub const USER: &str = "user";
    /// Workspace collection (Workspace Store)
    pub const WORKSPACES: &str = "workspaces";
    /// Map of workspace id -> message array (Conversation Store)
    pub const MESSAGES: &str = "messages";
    /// AI service catalog (Service Registry Store)
    pub const AI_SERVICES: &str = "aiServices";
    /// Usage statistic rows (Analytics Store)
    pub const USAGE_STATS: &str = "usageStats";
    /// Misc app settings (selected analytics period)
    pub const SETTINGS: &str = "settings";
}
