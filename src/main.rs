//! A.min Shield server binary

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use amin_shield::{config::Config, create_router, session, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "amin_shield=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("A.min Shield server starting ({})...", config.environment);
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, security reports will use the fallback narrative");
    }
    if !config.is_production() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config);
    session::spawn_sweeper(state.sessions.clone(), session::SESSION_SWEEP_INTERVAL);
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
