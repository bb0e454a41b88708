//! Simulated authentication gate
//!
//! No account store exists. A request passes when its fields are valid, the
//! email domain is not blocked and the simulated backend does not "fail"
//! (a configurable random share of attempts, 10% by default).

use rand::Rng;
use thiserror::Error;
use validator::Validate;

use crate::models::{display_name, AuthMode, LoginRequest, UserRole};

pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &["example.com", "mailinator.com", "tempmail.com"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthGateError {
    #[error("{0}")]
    InvalidField(String),

    #[error("Sign-ups from {0} are not allowed. Please use a corporate email address.")]
    BlockedDomain(String),

    #[error("Authentication service temporarily unavailable. Please try again.")]
    SimulatedOutage,
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    failure_rate: f64,
    blocked_domains: Vec<String>,
}

/// Identity handed out by the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
    pub display_name: String,
    pub role: String,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(
            DEFAULT_FAILURE_RATE,
            DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        )
    }
}

impl AuthGate {
    pub fn new(failure_rate: f64, blocked_domains: Vec<String>) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            blocked_domains: blocked_domains
                .into_iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn authenticate<R: Rng + ?Sized>(
        &self,
        mode: AuthMode,
        req: &LoginRequest,
        rng: &mut R,
    ) -> Result<AuthenticatedUser, AuthGateError> {
        req.validate()
            .map_err(|e| AuthGateError::InvalidField(first_message(&e)))?;

        let email = req.email.trim().to_ascii_lowercase();
        if let Some(domain) = self.blocked_domain(&email) {
            tracing::warn!("Rejected {} attempt from blocked domain {}", mode.as_str(), domain);
            return Err(AuthGateError::BlockedDomain(domain.to_string()));
        }

        if rng.gen_bool(self.failure_rate) {
            tracing::warn!("Simulated auth outage for {} ({})", email, mode.as_str());
            return Err(AuthGateError::SimulatedOutage);
        }

        Ok(AuthenticatedUser {
            display_name: display_name(&email),
            email,
            role: UserRole::SecurityAnalyst.as_str().to_string(),
        })
    }

    fn blocked_domain<'a>(&self, email: &'a str) -> Option<&'a str> {
        let domain = email.rsplit_once('@').map(|(_, d)| d)?;
        self.blocked_domains
            .iter()
            .any(|blocked| blocked == domain)
            .then_some(domain)
    }
}

/// Form fields reported first, in screen order. Other fields follow by name.
const FIELD_ORDER: &[&str] = &["email", "password"];

/// First human-readable message out of a validation report
pub fn first_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(name, _)| {
        let name: &str = name.as_ref();
        let rank = FIELD_ORDER
            .iter()
            .position(|field| *field == name)
            .unwrap_or(FIELD_ORDER.len());
        (rank, name.to_string())
    });

    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(email: &str, password: &str) -> LoginRequest {
        LoginRequest { email: email.to_string(), password: password.to_string() }
    }

    fn reliable_gate() -> AuthGate {
        AuthGate::new(0.0, vec!["example.com".to_string()])
    }

    #[test]
    fn test_valid_login() {
        let mut rng = StdRng::seed_from_u64(1);
        let user = reliable_gate()
            .authenticate(AuthMode::Login, &request("Analyst@Company.io", "s3cure-pass"), &mut rng)
            .unwrap();
        assert_eq!(user.email, "analyst@company.io");
        assert_eq!(user.display_name, "analyst");
        assert_eq!(user.role, "Security Analyst");
    }

    #[test]
    fn test_field_validation() {
        let mut rng = StdRng::seed_from_u64(1);
        let gate = reliable_gate();

        let err = gate
            .authenticate(AuthMode::Login, &request("analyst", "s3cure-pass"), &mut rng)
            .unwrap_err();
        assert_eq!(err, AuthGateError::InvalidField("Please enter a valid email address".to_string()));

        let err = gate
            .authenticate(AuthMode::Signup, &request("analyst@company.io", "short"), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            AuthGateError::InvalidField("Password must be at least 8 characters".to_string())
        );
    }

    #[test]
    fn test_email_error_reported_before_password() {
        let mut rng = StdRng::seed_from_u64(1);
        let gate = reliable_gate();

        for _ in 0..20 {
            let err = gate
                .authenticate(AuthMode::Login, &request("not-an-email", "short"), &mut rng)
                .unwrap_err();
            assert_eq!(err, AuthGateError::InvalidField("Please enter a valid email address".to_string()));
        }
    }

    #[test]
    fn test_blocked_domain() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = reliable_gate()
            .authenticate(AuthMode::Signup, &request("bob@EXAMPLE.com", "s3cure-pass"), &mut rng)
            .unwrap_err();
        assert_eq!(err, AuthGateError::BlockedDomain("example.com".to_string()));
    }

    #[test]
    fn test_failure_rate_extremes() {
        let mut rng = StdRng::seed_from_u64(9);
        let req = request("analyst@company.io", "s3cure-pass");

        let always = AuthGate::new(1.0, vec![]);
        let never = AuthGate::new(0.0, vec![]);
        for _ in 0..50 {
            assert_eq!(
                always.authenticate(AuthMode::Login, &req, &mut rng).unwrap_err(),
                AuthGateError::SimulatedOutage
            );
            assert!(never.authenticate(AuthMode::Login, &req, &mut rng).is_ok());
        }
    }

    #[test]
    fn test_default_failure_rate_is_occasional() {
        let mut rng = StdRng::seed_from_u64(2024);
        let gate = AuthGate::new(DEFAULT_FAILURE_RATE, vec![]);
        let req = request("analyst@company.io", "s3cure-pass");

        let failures = (0..2000)
            .filter(|_| gate.authenticate(AuthMode::Login, &req, &mut rng).is_err())
            .count();
        assert!((100..=300).contains(&failures), "failures = {}", failures);
    }

    #[test]
    fn test_out_of_range_rate_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let gate = AuthGate::new(7.5, vec![]);
        let req = request("analyst@company.io", "s3cure-pass");
        assert!(gate.authenticate(AuthMode::Login, &req, &mut rng).is_err());
    }
}
