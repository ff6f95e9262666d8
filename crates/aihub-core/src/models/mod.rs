pub mod message;
pub mod service;
pub mod usage;
pub mod user;
pub mod workspace;

pub use message::{Attachment, AttachmentKind, Message, Sender, SenderKind};
pub use service::{AiService, Provider};
pub use usage::{Period, PeriodTotals, UsageStats};
pub use user::{User, UserPatch};
pub use workspace::{Activity, ActivityKind, Workspace, WorkspacePatch, WorkspaceSpec};
