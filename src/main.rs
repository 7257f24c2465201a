mod api;
mod auth;
mod cleanup;
mod config;
mod mailbox;
mod session;

use std::sync::Arc;

use config::AppConfig;
use session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionStore>,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("MailSweep starting...");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("OAuth redirect: {}", config.google.redirect_uri);
    tracing::info!("Frontend: {}", config.frontend.url);

    // Session store plus its periodic expiry sweeper
    let sessions = Arc::new(SessionStore::new());
    let sweeper = sessions.clone().spawn_sweeper();

    // One HTTP client shared by OAuth profile lookups and all Gmail calls
    let http = reqwest::Client::new();

    // Build app state
    let state = AppState {
        config: config.clone(),
        sessions,
        http,
    };

    // Build router
    let app = api::router::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("MailSweep API listening on {}", addr);

    axum::serve(listener, app).await?;

    sweeper.abort();
    Ok(())
}
