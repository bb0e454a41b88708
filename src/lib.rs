//! A.min Shield Backend
//!
//! JSON API behind the A.min adversarial data security dashboard.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      A.MIN SHIELD                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Scan Timelines         │ │
//! │  │  Gateway  │  │  Gate     │  │  (Tokio timers)         │ │
//! │  │  (Axum)   │  │  (JWT)    │  │                         │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │   ┌──────────────────────────┐   ┌──────────────────────┐  │
//! │   │ In-memory session store  │   │ Gemini narrative API │  │
//! │   └──────────────────────────┘   └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod middleware;
pub mod models;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};

use config::Config;
use logic::{AuthGate, GeminiNarrative, NarrativeService};
use session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub auth_gate: AuthGate,
    pub narrative: Arc<dyn NarrativeService>,
}

impl AppState {
    /// Build state with the Gemini client described by `config`
    pub fn new(config: Config) -> Self {
        let narrative = GeminiNarrative::new(config.gemini_api_key.clone(), config.gemini_model.clone())
            .with_base_url(config.gemini_base_url.clone());

        Self::with_narrative(config, Arc::new(narrative))
    }

    pub fn with_narrative(config: Config, narrative: Arc<dyn NarrativeService>) -> Self {
        let sessions = SessionStore::new(
            config.scan_point_total,
            config.scan_timings.clone(),
            Duration::from_secs(config.jwt_expiration_hours.saturating_mul(3600)),
        );
        let auth_gate = AuthGate::new(config.auth_failure_rate, config.auth_blocked_domains.clone());

        Self {
            config,
            sessions: Arc::new(sessions),
            auth_gate,
            narrative,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/signup", post(handlers::auth::signup));

    // Session routes (user JWT auth)
    let session_routes = Router::new()
        .route("/api/v1/auth/logout", post(handlers::auth::logout))

        // Dashboard
        .route("/api/v1/dashboard", get(handlers::dashboard::overview))

        // Scanner
        .route("/api/v1/scans", post(handlers::scans::start))
        .route("/api/v1/scans/connect", post(handlers::scans::connect))
        .route("/api/v1/scans/current", get(handlers::scans::current))
        .route("/api/v1/scans/current/confirm", post(handlers::scans::confirm))
        .route("/api/v1/scans/current/reset", post(handlers::scans::reset))
        .route(
            "/api/v1/scans/current/selection",
            put(handlers::scans::select_point).delete(handlers::scans::clear_selection),
        )

        // History
        .route("/api/v1/history", get(handlers::history::list))
        .route("/api/v1/history/:id/export", get(handlers::history::export))

        // Visualizer
        .route("/api/v1/visualizer", get(handlers::visualizer::generate))

        // Reports
        .route("/api/v1/reports/security", get(handlers::reports::security))

        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_auth
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
