//! Heartbeat token CLI commands.

use clap::{Args, Subcommand, ValueEnum};

use crate::output::{self, FieldRow, OutputFormat};
use heartgate_core::config::AppConfig;
use heartgate_core::error::AppError;
use heartgate_core::types::{HeartbeatClaims, RejectStrategy};
use heartgate_token::TokenCodec;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Mint a backend-originated token that starts a new session
    Issue(IssueArgs),
    /// Decrypt a token and show its claims
    Inspect {
        /// Token to decode
        token: String,
    },
}

/// Policy carried by an issued token
#[derive(Debug, Args)]
pub struct IssueArgs {
    /// Account the token belongs to
    #[arg(long)]
    pub user_id: String,
    /// Content being played
    #[arg(long)]
    pub asset_id: Option<String>,
    /// Expected seconds between heartbeats
    #[arg(long)]
    pub heartbeat_cycle: Option<u64>,
    /// Seconds a heartbeat may arrive early
    #[arg(long)]
    pub cycle_lower_tolerance: Option<u64>,
    /// Seconds a heartbeat may arrive late
    #[arg(long)]
    pub cycle_upper_tolerance: Option<u64>,
    /// Which sessions lose when the limit is hit
    #[arg(long, value_enum)]
    pub reject_strategy: Option<StrategyArg>,
    /// Maximum number of eligible sessions
    #[arg(long)]
    pub session_limit: Option<u64>,
    /// Heartbeats before a session counts toward the limit
    #[arg(long)]
    pub checking_threshold: Option<u64>,
    /// Hard cap on active sessions
    #[arg(long)]
    pub sessions_edge: Option<u64>,
}

/// Command-line spelling of [`RejectStrategy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Reject the newest sessions
    MostRecent,
    /// Reject the oldest sessions
    LeastRecent,
}

impl From<StrategyArg> for RejectStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::MostRecent => Self::MostRecent,
            StrategyArg::LeastRecent => Self::LeastRecent,
        }
    }
}

impl IssueArgs {
    /// Claims of a backend-originated token: no session id, no timestamps.
    pub fn to_claims(&self) -> HeartbeatClaims {
        let mut claims = HeartbeatClaims::for_user(self.user_id.clone());
        claims.asset_id = self.asset_id.clone();
        claims.heartbeat_cycle = self.heartbeat_cycle;
        claims.cycle_lower_tolerance = self.cycle_lower_tolerance;
        claims.cycle_upper_tolerance = self.cycle_upper_tolerance;
        claims.reject_strategy = self.reject_strategy.map(Into::into);
        claims.session_limit = self.session_limit;
        claims.checking_threshold = self.checking_threshold;
        claims.sessions_edge = self.sessions_edge;
        claims
    }
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    if config.token.uses_default_key() {
        output::print_warning("Using the built-in development shared key");
    }
    let codec = TokenCodec::from_config(&config.token);

    match &args.command {
        TokenCommand::Issue(issue) => {
            let claims = issue.to_claims();
            if claims.user_id.trim().is_empty() {
                return Err(AppError::validation("--user-id must not be empty"));
            }
            let token = codec.encode(&claims)?;
            output::print_item(
                &serde_json::json!({ "heartbeat_token": token }),
                vec![FieldRow::new("heartbeat_token", &token)],
                format,
            );
        }
        TokenCommand::Inspect { token } => {
            let claims = codec.decode(token).map_err(|e| {
                AppError::validation(format!("Token could not be decoded: {e}"))
            })?;
            output::print_item(&claims, claim_rows(&claims), format);
        }
    }

    Ok(())
}

/// Detail rows for a claim set, `-` marking unset fields.
fn claim_rows(claims: &HeartbeatClaims) -> Vec<FieldRow> {
    fn show<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)
    }

    vec![
        FieldRow::new("user_id", &claims.user_id),
        FieldRow::new("session_id", show(&claims.session_id)),
        FieldRow::new("asset_id", show(&claims.asset_id)),
        FieldRow::new("heartbeat_cycle", show(&claims.heartbeat_cycle)),
        FieldRow::new("cycle_lower_tolerance", show(&claims.cycle_lower_tolerance)),
        FieldRow::new("cycle_upper_tolerance", show(&claims.cycle_upper_tolerance)),
        FieldRow::new("reject_strategy", show(&claims.reject_strategy)),
        FieldRow::new("session_limit", show(&claims.session_limit)),
        FieldRow::new("checking_threshold", show(&claims.checking_threshold)),
        FieldRow::new("sessions_edge", show(&claims.sessions_edge)),
        FieldRow::new("started_at", show(&claims.started_at.map(|t| t.to_rfc3339()))),
        FieldRow::new("timestamp", show(&claims.timestamp.map(|t| t.to_rfc3339()))),
    ]
}
