//! Session inspection CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use heartgate_core::config::AppConfig;
use heartgate_core::error::AppError;
use heartgate_core::traits::SessionStore;
use heartgate_core::types::UserSessionMap;
use heartgate_store::StoreManager;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List the sessions stored for a user
    List {
        /// User ID
        #[arg(long)]
        user_id: String,
    },
    /// Show the stored progress of a user in an asset
    Progress {
        /// User ID
        #[arg(long)]
        user_id: String,
        /// Asset ID
        #[arg(long)]
        asset_id: String,
    },
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Session ID
    session_id: String,
    /// Started
    started_at: String,
    /// Last heartbeat
    last_seen: String,
    /// Accepted heartbeats
    hit_counter: u64,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if config.store.provider == "memory" {
        output::print_warning(
            "The memory store lives inside the server process; this command only sees an empty store",
        );
    }
    let store = StoreManager::new(&config.store).await?;

    match &args.command {
        SessionCommand::List { user_id } => {
            let data = store.fetch_user_session_data(user_id).await?;
            output::print_list(&session_rows(&data.sessions), format);
        }
        SessionCommand::Progress { user_id, asset_id } => {
            match store.fetch_progress(user_id, asset_id).await? {
                Some(progress) => output::print_json(&progress),
                None => println!("No progress stored."),
            }
        }
    }

    Ok(())
}

fn session_rows(sessions: &UserSessionMap) -> Vec<SessionRow> {
    sessions
        .iter()
        .map(|(session_id, record)| SessionRow {
            session_id: session_id.clone(),
            started_at: record.started_at.to_rfc3339(),
            last_seen: record.timestamp.to_rfc3339(),
            hit_counter: record.hit_counter,
        })
        .collect()
}
