//! User/session model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Login,
    Signup,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserRole {
    SecurityAnalyst,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityAnalyst => "Security Analyst",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub session_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub mode: AuthMode,
    pub user: UserInfo,
}

/// Local part of an email, used as display name
pub fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
