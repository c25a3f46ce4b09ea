//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, FieldRow, OutputFormat};
use heartgate_core::config::AppConfig;
use heartgate_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate the configuration
    Validate,
}

/// Effective configuration as displayed.
#[derive(Debug, Serialize)]
struct ConfigView {
    bind_address: String,
    body_limit_bytes: usize,
    shared_key: &'static str,
    store_provider: String,
    redis_url: String,
    redis_key_prefix: String,
    session_ttl_seconds: u64,
    log_level: String,
    log_format: String,
}

impl ConfigView {
    fn new(config: &AppConfig) -> Self {
        Self {
            bind_address: config.server.bind_address(),
            body_limit_bytes: config.server.body_limit_bytes,
            shared_key: if config.token.uses_default_key() {
                "(default)"
            } else {
                "****"
            },
            store_provider: config.store.provider.clone(),
            redis_url: config.store.redis.masked_url(),
            redis_key_prefix: config.store.redis.key_prefix.clone(),
            session_ttl_seconds: config.store.redis.session_ttl_seconds,
            log_level: config.logging.level.clone(),
            log_format: config.logging.format.clone(),
        }
    }

    fn rows(&self) -> Vec<FieldRow> {
        vec![
            FieldRow::new("bind_address", &self.bind_address),
            FieldRow::new("body_limit_bytes", self.body_limit_bytes),
            FieldRow::new("shared_key", self.shared_key),
            FieldRow::new("store_provider", &self.store_provider),
            FieldRow::new("redis_url", &self.redis_url),
            FieldRow::new("redis_key_prefix", &self.redis_key_prefix),
            FieldRow::new("session_ttl_seconds", self.session_ttl_seconds),
            FieldRow::new("log_level", &self.log_level),
            FieldRow::new("log_format", &self.log_format),
        ]
    }
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    loaded: Result<AppConfig, AppError>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let view = ConfigView::new(&loaded?);
            output::print_item(&view, view.rows(), format);
        }
        ConfigCommand::Validate => {
            let config = loaded.inspect_err(|e| {
                output::print_error(&format!("Configuration invalid: {e}"));
            })?;

            let problems = validate(&config);
            if !problems.is_empty() {
                for problem in &problems {
                    output::print_error(problem);
                }
                return Err(AppError::validation(format!(
                    "{} configuration problem(s)",
                    problems.len()
                )));
            }

            if config.token.uses_default_key() {
                output::print_warning("token.shared_key is the built-in development key");
            }
            output::print_success("Configuration is valid");
            output::print_kv("Server", &config.server.bind_address());
            output::print_kv("Store", &config.store.provider);
            output::print_kv("Logging", &format!("{} ({})", config.logging.level, config.logging.format));
        }
    }

    Ok(())
}

/// Problems that would stop the server from starting or serving.
fn validate(config: &AppConfig) -> Vec<String> {
    let mut problems = Vec::new();

    if config.token.shared_key.is_empty() {
        problems.push("token.shared_key must not be empty".to_string());
    }
    if !matches!(config.store.provider.as_str(), "memory" | "redis") {
        problems.push(format!(
            "store.provider '{}' is not one of: memory, redis",
            config.store.provider
        ));
    }
    if !matches!(config.logging.format.as_str(), "json" | "pretty") {
        problems.push(format!(
            "logging.format '{}' is not one of: json, pretty",
            config.logging.format
        ));
    }
    if config.server.body_limit_bytes == 0 {
        problems.push("server.body_limit_bytes must be positive".to_string());
    }

    problems
}
