//! Demo seed data.
//!
//! First-run state for the demo build: a session user, the fixed AI-service
//! catalog, a few starter workspaces, a starter conversation thread, and
//! sample usage rows. Stores fall back to these whenever the corresponding
//! persisted blob is absent, so wiping the data directory resets the app to
//! this state on the next cold start.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::{
    Activity, ActivityKind, AiService, Message, Period, Provider, Sender, SenderKind, UsageStats,
    User, Workspace,
};

pub fn demo_user() -> User {
    User {
        id: "user-1".to_string(),
        name: "Alex Johnson".to_string(),
        email: "alex@example.com".to_string(),
        avatar: Some(
            "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?q=80&w=100&auto=format&fit=crop"
                .to_string(),
        ),
        is_student: true,
        student_verified: true,
    }
}

/// The fixed service catalog. Seeded once; entries are mutated in place and
/// never deleted.
pub fn service_catalog() -> Vec<AiService> {
    vec![
        AiService {
            id: "ai-1".to_string(),
            name: "ChatGPT".to_string(),
            provider: Provider::Openai,
            icon: "https://upload.wikimedia.org/wikipedia/commons/thumb/0/04/ChatGPT_logo.svg/120px-ChatGPT_logo.svg.png".to_string(),
            is_connected: true,
            description: "OpenAI's powerful language model for text generation and conversation.".to_string(),
            capabilities: vec![
                "Text generation".to_string(),
                "Code assistance".to_string(),
                "Creative writing".to_string(),
                "Research help".to_string(),
            ],
            usage_limit: Some(1000),
            usage_remaining: Some(750),
        },
        AiService {
            id: "ai-2".to_string(),
            name: "Claude".to_string(),
            provider: Provider::Anthropic,
            icon: "https://upload.wikimedia.org/wikipedia/commons/thumb/1/10/Claude_%28AI%29_logo.svg/120px-Claude_%28AI%29_logo.svg.png".to_string(),
            is_connected: false,
            description: "Anthropic's AI assistant focused on helpfulness, harmlessness, and honesty.".to_string(),
            capabilities: vec![
                "Long context".to_string(),
                "Document analysis".to_string(),
                "Nuanced reasoning".to_string(),
                "Safety features".to_string(),
            ],
            usage_limit: None,
            usage_remaining: None,
        },
        AiService {
            id: "ai-3".to_string(),
            name: "Gemini".to_string(),
            provider: Provider::Google,
            icon: "https://storage.googleapis.com/gweb-uniblog-publish-prod/images/gemini_1.max-100x100.png".to_string(),
            is_connected: true,
            description: "Google's multimodal AI system that can understand and generate text, images, and code.".to_string(),
            capabilities: vec![
                "Multimodal understanding".to_string(),
                "Code generation".to_string(),
                "Problem solving".to_string(),
                "Creative content".to_string(),
            ],
            usage_limit: Some(500),
            usage_remaining: Some(320),
        },
        AiService {
            id: "ai-4".to_string(),
            name: "DeepSeek".to_string(),
            provider: Provider::Deepseek,
            icon: "https://avatars.githubusercontent.com/u/145890654?s=200&v=4".to_string(),
            is_connected: false,
            description: "Advanced AI model specialized in deep reasoning and complex problem solving.".to_string(),
            capabilities: vec![
                "Deep reasoning".to_string(),
                "Technical expertise".to_string(),
                "Mathematical problem solving".to_string(),
                "Research assistance".to_string(),
            ],
            usage_limit: None,
            usage_remaining: None,
        },
    ]
}

/// Starter workspaces, most recently updated first. Timestamps are relative
/// to now so the demo never looks stale.
pub fn demo_workspaces() -> Vec<Workspace> {
    let now = Utc::now();
    vec![
        Workspace {
            id: "ws-1".to_string(),
            name: "Research Project".to_string(),
            description: "AI-assisted research on renewable energy".to_string(),
            created_at: now - Duration::days(8),
            updated_at: now - Duration::hours(2),
            is_team: true,
            members: None,
            ai_services: vec!["ai-1".to_string(), "ai-2".to_string()],
            recent_activity: Some(vec![Activity {
                id: format!("act-{}", Uuid::new_v4()),
                kind: ActivityKind::Message,
                content: "Added new research paper on solar efficiency".to_string(),
                timestamp: now - Duration::hours(2),
                user: None,
                ai_service: None,
            }]),
            icon: Some("🔬".to_string()),
        },
        Workspace {
            id: "ws-2".to_string(),
            name: "Essay Writing".to_string(),
            description: "Working on college application essays".to_string(),
            created_at: now - Duration::days(6),
            updated_at: now - Duration::days(1),
            is_team: false,
            members: None,
            ai_services: vec!["ai-1".to_string()],
            recent_activity: None,
            icon: Some("📝".to_string()),
        },
        Workspace {
            id: "ws-3".to_string(),
            name: "Product Design".to_string(),
            description: "Collaborative design for new mobile app".to_string(),
            created_at: now - Duration::days(13),
            updated_at: now - Duration::days(3),
            is_team: true,
            members: None,
            ai_services: vec!["ai-2".to_string(), "ai-3".to_string()],
            recent_activity: None,
            icon: Some("🎨".to_string()),
        },
    ]
}

/// Starter conversation thread for a workspace.
pub fn demo_thread(workspace_id: &str) -> Vec<Message> {
    let now = Utc::now();
    let user_sender = Sender {
        id: "user-1".to_string(),
        name: "Alex Johnson".to_string(),
        kind: SenderKind::User,
        avatar: None,
    };
    let ai_sender = Sender {
        id: "ai-1".to_string(),
        name: "ChatGPT".to_string(),
        kind: SenderKind::Ai,
        avatar: Some(
            "https://upload.wikimedia.org/wikipedia/commons/thumb/0/04/ChatGPT_logo.svg/120px-ChatGPT_logo.svg.png"
                .to_string(),
        ),
    };
    vec![
        Message {
            id: "msg-1".to_string(),
            content: "Can you help me research the latest advancements in solar panel efficiency?"
                .to_string(),
            timestamp: now - Duration::minutes(10),
            sender: user_sender.clone(),
            ai_service: Some("ai-1".to_string()),
            workspace_id: workspace_id.to_string(),
            attachments: None,
        },
        Message {
            id: "msg-2".to_string(),
            content: "Of course! Recent advancements in solar panel efficiency have focused on \
                      perovskite cells above 25%, tandem cells exceeding 30% in lab settings, and \
                      bifacial panels with 10-20% energy gains. Would you like me to elaborate on \
                      any of these technologies?"
                .to_string(),
            timestamp: now - Duration::minutes(8),
            sender: ai_sender,
            ai_service: Some("ai-1".to_string()),
            workspace_id: workspace_id.to_string(),
            attachments: None,
        },
        Message {
            id: "msg-3".to_string(),
            content: "Tell me more about perovskite solar cells and their commercial viability."
                .to_string(),
            timestamp: now - Duration::minutes(5),
            sender: user_sender,
            ai_service: Some("ai-1".to_string()),
            workspace_id: workspace_id.to_string(),
            attachments: None,
        },
    ]
}

/// Sample usage rows across the three aggregation periods.
pub fn demo_usage_stats() -> Vec<UsageStats> {
    vec![
        UsageStats { ai_service: "ai-1".to_string(), messages_count: 145, tokens_used: 28_500, cost: 0.57, period: Period::Monthly },
        UsageStats { ai_service: "ai-3".to_string(), messages_count: 87, tokens_used: 15_200, cost: 0.32, period: Period::Monthly },
        UsageStats { ai_service: "ai-1".to_string(), messages_count: 42, tokens_used: 8_300, cost: 0.17, period: Period::Weekly },
        UsageStats { ai_service: "ai-3".to_string(), messages_count: 23, tokens_used: 4_100, cost: 0.09, period: Period::Weekly },
        UsageStats { ai_service: "ai-1".to_string(), messages_count: 8, tokens_used: 1_500, cost: 0.03, period: Period::Daily },
        UsageStats { ai_service: "ai-3".to_string(), messages_count: 5, tokens_used: 900, cost: 0.02, period: Period::Daily },
    ]
}
