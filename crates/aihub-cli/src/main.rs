use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use aihub_core::constants::AI_REPLY_DELAY_MS;
use aihub_core::models::{Activity, ActivityKind, Period, UsageStats, UserPatch, WorkspaceSpec};
use aihub_core::{CoreConfig, HubRuntime};

#[derive(Parser)]
#[command(name = "aihub-cli")]
#[command(about = "CLI front-end for the AI Workspace Hub state core")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Data directory (defaults to the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Disable the demo auto-login when no session is persisted
    #[arg(long)]
    no_demo_login: bool,

    /// Base URL for the (stub) backend API
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in (demo build: any non-empty credentials succeed)
    Login {
        email: String,
        password: String,
    },

    /// Register a new account
    Register {
        name: String,
        email: String,
        password: String,
        #[arg(long)]
        student: bool,
    },

    /// Sign out and clear the persisted session
    Logout,

    /// Show the current session user
    Profile,

    /// Update profile fields
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },

    /// List workspaces (current one marked)
    Workspaces,

    /// Create a workspace and make it current
    CreateWorkspace {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        team: bool,
        #[arg(long)]
        icon: Option<String>,
        /// AI service ids to associate (repeatable)
        #[arg(long = "service")]
        services: Vec<String>,
    },

    /// Delete a workspace
    DeleteWorkspace { id: String },

    /// Make a workspace current
    SelectWorkspace { id: String },

    /// Append an activity to a workspace's feed
    AddActivity {
        workspace_id: String,
        /// One of: message, file, update, join
        kind: String,
        content: String,
    },

    /// List the AI service catalog
    Services,

    /// Connect an AI service
    Connect { id: String },

    /// Disconnect an AI service
    Disconnect { id: String },

    /// Overwrite a service's remaining quota
    SetUsage { id: String, remaining: u64 },

    /// Send a chat message (waits for the simulated reply)
    Send {
        content: String,
        /// Workspace id (defaults to the current workspace)
        #[arg(long)]
        workspace: Option<String>,
        /// Service id (defaults to the current chat service)
        #[arg(long)]
        service: Option<String>,
    },

    /// Print a workspace's message thread
    History { workspace_id: String },

    /// Delete a workspace's message thread
    ClearChat { workspace_id: String },

    /// Switch the chat service selector
    SwitchService { id: String },

    /// Show usage totals for a period (defaults to the selected period)
    Stats {
        /// One-off override; the persisted selected period is untouched
        #[arg(long)]
        period: Option<String>,
    },

    /// Change the persisted selected analytics period
    SetPeriod { period: String },

    /// Append a usage row
    RecordUsage {
        service_id: String,
        messages: u64,
        tokens: u64,
        cost: f64,
        period: String,
    },

    /// Wipe all persisted state
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => dirs::data_dir()
            .context("could not determine platform data directory")?
            .join("aihub"),
    };

    let mut config = CoreConfig::new(data_dir).with_demo_auto_login(!cli.no_demo_login);
    if let Some(url) = cli.api_url.clone() {
        config = config.with_api_base_url(url);
    }

    let runtime = HubRuntime::new(config)?;
    runtime.init();

    let output = run_command(&runtime, cli.command).await?;

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string(&output)?);
    }

    runtime.shutdown();
    Ok(())
}

async fn run_command(runtime: &HubRuntime, command: Commands) -> Result<serde_json::Value> {
    let value = match command {
        Commands::Login { email, password } => {
            let ok = runtime.identity().login(&email, &password).await;
            if ok {
                runtime.load_user_scoped();
            }
            json!({ "ok": ok, "user": runtime.identity().user() })
        }
        Commands::Register {
            name,
            email,
            password,
            student,
        } => {
            let ok = runtime
                .identity()
                .register(&name, &email, &password, student)
                .await;
            if ok {
                runtime.load_user_scoped();
            }
            json!({ "ok": ok, "user": runtime.identity().user() })
        }
        Commands::Logout => {
            runtime.identity().logout();
            json!({ "ok": true })
        }
        Commands::Profile => json!({ "user": runtime.identity().user() }),
        Commands::UpdateProfile { name, email, avatar } => {
            let ok = runtime.identity().update_profile(UserPatch {
                name,
                email,
                avatar,
                ..Default::default()
            });
            json!({ "ok": ok, "user": runtime.identity().user() })
        }

        Commands::Workspaces => {
            let current = runtime.workspaces().current().map(|ws| ws.id);
            json!({
                "current": current,
                "workspaces": runtime.workspaces().workspaces(),
            })
        }
        Commands::CreateWorkspace {
            name,
            description,
            team,
            icon,
            services,
        } => {
            let workspace = runtime.workspaces().create(WorkspaceSpec {
                name,
                description,
                is_team: team,
                members: None,
                ai_services: services,
                icon,
            });
            json!({ "ok": workspace.is_some(), "workspace": workspace })
        }
        Commands::DeleteWorkspace { id } => {
            let ok = runtime.workspaces().delete(&id);
            json!({ "ok": ok })
        }
        Commands::SelectWorkspace { id } => {
            let ok = runtime.workspaces().select(&id);
            json!({ "ok": ok, "current": runtime.workspaces().current().map(|ws| ws.id) })
        }
        Commands::AddActivity {
            workspace_id,
            kind,
            content,
        } => {
            let kind = parse_activity_kind(&kind)?;
            let ok = runtime
                .workspaces()
                .add_activity(&workspace_id, Activity::new(kind, content));
            json!({ "ok": ok })
        }

        Commands::Services => json!({ "services": runtime.services().services() }),
        Commands::Connect { id } => {
            let ok = runtime.services().connect(&id);
            json!({ "ok": ok, "service": runtime.services().get(&id) })
        }
        Commands::Disconnect { id } => {
            let ok = runtime.services().disconnect(&id);
            json!({ "ok": ok, "service": runtime.services().get(&id) })
        }
        Commands::SetUsage { id, remaining } => {
            let ok = runtime.services().update_usage(&id, remaining);
            json!({ "ok": ok, "service": runtime.services().get(&id) })
        }

        Commands::Send {
            content,
            workspace,
            service,
        } => {
            let workspace_id = workspace
                .or_else(|| runtime.workspaces().current().map(|ws| ws.id))
                .context("no workspace selected; pass --workspace or select one")?;
            let service_id = service
                .or_else(|| runtime.conversations().current_service())
                .context("no chat service selected; pass --service or switch to one")?;

            let sent = runtime.conversations().send(&content, &workspace_id, &service_id);
            if sent.is_some() {
                // Block until the simulated reply lands so the printed
                // thread includes it.
                tokio::time::sleep(Duration::from_millis(AI_REPLY_DELAY_MS + 200)).await;
            }
            json!({
                "ok": sent.is_some(),
                "error": runtime.conversations().last_error(),
                "thread": runtime.conversations().messages(&workspace_id),
            })
        }
        Commands::History { workspace_id } => {
            json!({ "messages": runtime.conversations().messages(&workspace_id) })
        }
        Commands::ClearChat { workspace_id } => {
            let ok = runtime.conversations().clear(&workspace_id);
            json!({ "ok": ok, "error": runtime.conversations().last_error() })
        }
        Commands::SwitchService { id } => {
            let ok = runtime.conversations().switch_service(&id);
            json!({ "ok": ok, "currentService": runtime.conversations().current_service() })
        }

        Commands::Stats { period } => {
            let period = match period {
                Some(p) => p
                    .parse::<Period>()
                    .map_err(|e| anyhow::anyhow!(e))?,
                None => runtime.analytics().selected_period(),
            };
            json!({
                "period": period.as_str(),
                "totals": runtime.analytics().aggregate(period),
                "rows": runtime.analytics().stats_for(period),
            })
        }
        Commands::SetPeriod { period } => {
            let period = period.parse::<Period>().map_err(|e| anyhow::anyhow!(e))?;
            runtime.analytics().set_period(period);
            json!({ "ok": true, "period": period.as_str() })
        }
        Commands::RecordUsage {
            service_id,
            messages,
            tokens,
            cost,
            period,
        } => {
            let period = period.parse::<Period>().map_err(|e| anyhow::anyhow!(e))?;
            let ok = runtime.analytics().record_usage(UsageStats {
                ai_service: service_id,
                messages_count: messages,
                tokens_used: tokens,
                cost,
                period,
            });
            json!({ "ok": ok })
        }

        Commands::Reset => {
            runtime.storage().clear()?;
            json!({ "ok": true })
        }
    };
    Ok(value)
}

fn parse_activity_kind(input: &str) -> Result<ActivityKind> {
    match input {
        "message" => Ok(ActivityKind::Message),
        "file" => Ok(ActivityKind::File),
        "update" => Ok(ActivityKind::Update),
        "join" => Ok(ActivityKind::Join),
        other => anyhow::bail!("unknown activity kind: {other} (expected message|file|update|join)"),
    }
}
