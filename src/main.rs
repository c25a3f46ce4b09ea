//! Heartgate server: concurrent-session limiting over stateless heartbeats.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use heartgate_core::config::AppConfig;
use heartgate_core::error::AppError;
use heartgate_core::traits::SessionStore;
use heartgate_service::HeartbeatService;
use heartgate_store::StoreManager;
use heartgate_token::TokenCodec;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("HEARTGATE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Heartgate v{}", env!("CARGO_PKG_VERSION"));

    if config.token.uses_default_key() {
        tracing::warn!(
            "No shared key configured; using the built-in development key. \
             Set SHARED_KEY or HEARTGATE__TOKEN__SHARED_KEY in production"
        );
    }

    tracing::info!(provider = %config.store.provider, "Initializing session store...");
    let store: Arc<dyn SessionStore> = Arc::new(StoreManager::new(&config.store).await?);
    if !store.health_check().await? {
        return Err(AppError::store_unavailable("Session store failed its health check"));
    }

    let codec = Arc::new(TokenCodec::from_config(&config.token));
    let heartbeat_service = Arc::new(HeartbeatService::new(codec, store));

    let addr = config.server.bind_address();
    let state = heartgate_api::AppState::new(Arc::new(config), heartbeat_service);
    let app = heartgate_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Heartgate listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Heartgate shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
