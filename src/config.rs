//! Configuration module

use std::env;
use std::time::Duration;

use crate::logic::auth_gate::{DEFAULT_BLOCKED_DOMAINS, DEFAULT_FAILURE_RATE};
use crate::logic::narrative::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::logic::ScanTimings;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// JWT secret key
    pub jwt_secret: String,

    /// JWT expiration in hours
    pub jwt_expiration_hours: u64,

    /// Environment (development, production)
    pub environment: String,

    /// Narrative service credential. Absent means every report uses the fallback text.
    pub gemini_api_key: Option<String>,

    pub gemini_model: String,

    pub gemini_base_url: String,

    /// Share of sign-in attempts that fail on purpose, 0.0 - 1.0
    pub auth_failure_rate: f64,

    /// Email domains refused by the auth gate
    pub auth_blocked_domains: Vec<String>,

    /// Size parameter of generated scan batches
    pub scan_point_total: usize,

    pub scan_timings: ScanTimings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            jwt_secret: "amin-shield-dev-secret-change-in-production".to_string(),
            jwt_expiration_hours: 24,
            environment: "development".to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            auth_failure_rate: DEFAULT_FAILURE_RATE,
            auth_blocked_domains: DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            scan_point_total: 100,
            scan_timings: ScanTimings::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timings = defaults.scan_timings.clone();

        Self {
            port: parsed("PORT").unwrap_or(defaults.port),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),

            jwt_expiration_hours: parsed("JWT_EXPIRATION_HOURS").unwrap_or(defaults.jwt_expiration_hours),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            gemini_api_key: env::var("GEMINI_API_KEY")
                .or_else(|_| env::var("API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),

            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),

            gemini_base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),

            auth_failure_rate: parsed::<f64>("AUTH_FAILURE_RATE")
                .filter(|r| r.is_finite())
                .map(|r| r.clamp(0.0, 1.0))
                .unwrap_or(defaults.auth_failure_rate),

            auth_blocked_domains: env::var("AUTH_BLOCKED_DOMAINS")
                .map(|list| {
                    list.split(',')
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.auth_blocked_domains),

            scan_point_total: parsed("SCAN_POINT_TOTAL").unwrap_or(defaults.scan_point_total),

            scan_timings: ScanTimings {
                upload_interval: millis("SCAN_UPLOAD_INTERVAL_MS").unwrap_or(timings.upload_interval),
                upload_increment: parsed::<u8>("SCAN_UPLOAD_INCREMENT")
                    .filter(|i| (1..=100).contains(i))
                    .unwrap_or(timings.upload_increment),
                file_step_interval: millis("SCAN_FILE_STEP_INTERVAL_MS").unwrap_or(timings.file_step_interval),
                stream_step_interval: millis("SCAN_STREAM_STEP_INTERVAL_MS")
                    .unwrap_or(timings.stream_step_interval),
                completion_delay: millis("SCAN_COMPLETION_DELAY_MS").unwrap_or(timings.completion_delay),
            },
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn millis(key: &str) -> Option<Duration> {
    parsed::<u64>(key).filter(|ms| *ms > 0).map(Duration::from_millis)
}
