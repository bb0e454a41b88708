//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};

use crate::{AppState, AppError, AppResult};
use crate::logic::AuthenticatedUser;
use crate::middleware::auth::SessionContext;
use crate::models::{AuthMode, LoginRequest, LoginResponse, UserInfo};
use crate::session::Workspace;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // User email
    pub sid: String,      // Session ID
    pub role: String,     // User role
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    open_session(&state, AuthMode::Login, req)
}

/// Sign-up endpoint. Nothing is stored; it passes the same gate as login.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    open_session(&state, AuthMode::Signup, req)
}

/// Logout: drop the session and everything it held
pub async fn logout(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> StatusCode {
    state.sessions.close(ctx.session_id);
    tracing::info!("Session closed for {}", ctx.email);
    StatusCode::NO_CONTENT
}

fn open_session(state: &AppState, mode: AuthMode, req: LoginRequest) -> AppResult<Json<LoginResponse>> {
    let user = state
        .auth_gate
        .authenticate(mode, &req, &mut rand::thread_rng())?;

    let workspace = state.sessions.open(user);
    let token = generate_jwt(&workspace, &state.config.jwt_secret, state.config.jwt_expiration_hours)?;

    tracing::info!(
        "{} succeeded for {} (session {})",
        mode.as_str(),
        workspace.user.email,
        workspace.session_id
    );

    Ok(Json(LoginResponse {
        token,
        mode,
        user: user_info(&workspace),
    }))
}

fn user_info(workspace: &Workspace) -> UserInfo {
    let AuthenticatedUser { email, display_name, role } = workspace.user.clone();
    UserInfo {
        session_id: workspace.session_id,
        email,
        display_name,
        role,
    }
}

/// Generate JWT token
fn generate_jwt(workspace: &Workspace, secret: &str, expiration_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: workspace.user.email.clone(),
        sid: workspace.session_id.to_string(),
        role: workspace.user.role.clone(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}
