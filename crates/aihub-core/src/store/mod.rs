pub mod analytics;
pub mod conversations;
pub mod identity;
pub mod services;
pub mod workspaces;

pub use analytics::AnalyticsStore;
pub use conversations::ConversationStore;
pub use identity::{AuthState, IdentityStore};
pub use services::ServiceRegistry;
pub use workspaces::WorkspaceStore;
