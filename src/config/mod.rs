//! Configuration management for the prompt.rip auth service
//!
//! Loads and validates configuration from environment variables (and a
//! `.env` file when present). The token signing secret is mandatory.

use std::env;
use std::net::IpAddr;

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::auth::{AuthConfig, DEFAULT_CHALLENGE_WINDOW_SECS, DEFAULT_TOKEN_TTL_HOURS};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("JWT_SECRET must be at least {0} bytes long")]
    WeakSecret(usize),
}

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Bind address
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// Log filter (RUST_LOG)
    pub log_level: String,

    /// Rate limit: requests per second per client
    pub rate_limit_rps: u32,

    /// CORS allowed origins, comma separated
    pub cors_allowed_origins: Option<String>,

    /// Token signing secret and lifetimes
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let host = lookup("HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidValue("HOST must be an IP address".to_string()))?;

        let port = lookup("PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let rate_limit_rps = lookup("RATE_LIMIT_RPS")
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|rps| *rps > 0)
            .unwrap_or(20);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").filter(|s| !s.trim().is_empty());

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let token_ttl_hours = parse_positive(&lookup, "TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        let challenge_window_secs = parse_positive(
            &lookup,
            "CHALLENGE_WINDOW_SECS",
            DEFAULT_CHALLENGE_WINDOW_SECS,
        )?;

        let token_ttl = Duration::try_hours(token_ttl_hours)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| ConfigError::InvalidValue("TOKEN_TTL_HOURS is out of range".to_string()))?;
        let challenge_window = Duration::try_seconds(challenge_window_secs).ok_or_else(|| {
            ConfigError::InvalidValue("CHALLENGE_WINDOW_SECS is out of range".to_string())
        })?;

        let auth = AuthConfig::new(jwt_secret)?
            .with_token_ttl(token_ttl)
            .with_challenge_window(challenge_window);

        Ok(Config {
            environment,
            host,
            port,
            log_level,
            rate_limit_rps,
            cors_allowed_origins,
            auth,
        })
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth
    }
}

fn parse_positive<F>(lookup: &F, key: &str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(format!("{} must be a positive integer", key))
            }),
    }
}
