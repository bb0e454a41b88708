//! Authentication middleware

use std::sync::Arc;

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
    http::header::AUTHORIZATION,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::{AppState, AppError};
use crate::handlers::auth::Claims;
use crate::session::Workspace;

/// Session context resolved from the bearer token
#[derive(Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub email: String,
    pub workspace: Arc<Workspace>,
}

/// Middleware: Require a live session token
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    // Decode JWT
    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default()
    )?;

    let claims = token_data.claims;
    let session_id = Uuid::parse_str(&claims.sid).map_err(|_| AppError::TokenInvalid)?;

    // Logged-out and expired sessions keep a valid signature but no workspace
    let workspace = state.sessions.get(session_id).ok_or_else(|| {
        tracing::debug!("Token for closed session {} rejected", session_id);
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(SessionContext {
        session_id,
        email: claims.sub,
        workspace,
    });

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
