//! CLI command definitions and dispatch.

pub mod config;
pub mod session;
pub mod token;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use heartgate_core::config::AppConfig;
use heartgate_core::error::AppError;

/// Heartgate administration tool
#[derive(Debug, Parser)]
#[command(name = "heartgate", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the per-environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Configuration environment
    #[arg(short, long, env = "HEARTGATE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Issue and inspect heartbeat tokens
    Token(token::TokenArgs),
    /// Inspect stored sessions
    Session(session::SessionArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Token(args) => token::execute(args, &self.load_config()?, self.format),
            Commands::Session(args) => {
                session::execute(args, &self.load_config()?, self.format).await
            }
            Commands::Config(args) => config::execute(args, self.load_config(), self.format),
        }
    }

    /// Load configuration for the selected directory and environment.
    fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config_dir, &self.env)
    }
}
