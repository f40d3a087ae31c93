//! # API Configuration Module
//!
//! Loads server settings from environment variables, with defaults where
//! a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: bind address (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 5000)
//! - `DATABASE_URL`: PostgreSQL connection string. When unset the server
//!   runs against the in-memory store.
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 15)
//! - `APP_ENV`: deployment environment (default: "development"). In
//!   "production" the details of 5xx errors are withheld from clients.
//! - `SESSION_TTL_HOURS`: lifetime of login sessions (default: 24)
//! - `OTP_TTL_MINUTES`: lifetime of one-time codes (default: 10)
//! - `MAIL_FROM`: sender address for outbound email
//! - `MAIL_ENABLED`: whether outbound email is dispatched (default: false)

use chrono::Duration;
use eyre::{Result, WrapErr, eyre};
use smokecheck_db::IdentityConfig;
use std::env;
use tracing::Level;

const DEFAULT_MAIL_FROM: &str = "\"SET CAM\" <no-reply@setcam.local>";

/// Configuration for the SmokeCheck API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use smokecheck_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// PostgreSQL connection string; `None` selects the in-memory store
    pub database_url: Option<String>,

    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    pub app_env: String,

    pub session_ttl_hours: i64,

    pub otp_ttl_minutes: i64,

    pub mail_from: String,

    pub mail_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: None,
            log_level: Level::INFO,
            cors_origins: None,
            request_timeout: 15,
            app_env: "development".to_string(),
            session_ttl_hours: 24,
            otp_ttl_minutes: 10,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            mail_enabled: false,
        }
    }
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// Fails when a numeric setting (`API_PORT`, `SESSION_TTL_HOURS`,
    /// `OTP_TTL_MINUTES`) is present but cannot be parsed, or when a
    /// lifetime is not positive or too large to represent.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // Network settings
        let host = env::var("API_HOST").unwrap_or(defaults.host);
        let port = match env::var("API_PORT") {
            Ok(port) => port.parse().wrap_err("Invalid API_PORT value")?,
            Err(_) => defaults.port,
        };

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.request_timeout);

        let app_env = env::var("APP_ENV").unwrap_or(defaults.app_env);

        // Credential lifetimes
        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(value) => parse_lifetime("SESSION_TTL_HOURS", &value, Duration::try_hours)?,
            Err(_) => defaults.session_ttl_hours,
        };
        let otp_ttl_minutes = match env::var("OTP_TTL_MINUTES") {
            Ok(value) => parse_lifetime("OTP_TTL_MINUTES", &value, Duration::try_minutes)?,
            Err(_) => defaults.otp_ttl_minutes,
        };

        // Email
        let mail_from = env::var("MAIL_FROM").unwrap_or(defaults.mail_from);
        let mail_enabled = env::var("MAIL_ENABLED")
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.mail_enabled);

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            app_env,
            session_ttl_hours,
            otp_ttl_minutes,
            mail_from,
            mail_enabled,
        })
    }

    /// Returns the server address as a string (e.g. "0.0.0.0:5000")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Credential lifetimes. A value too large for a `Duration` falls back
    /// to the default; `from_env` never produces one.
    pub fn identity(&self) -> IdentityConfig {
        let defaults = IdentityConfig::default();
        IdentityConfig {
            session_ttl: Duration::try_hours(self.session_ttl_hours).unwrap_or(defaults.session_ttl),
            otp_ttl: Duration::try_minutes(self.otp_ttl_minutes).unwrap_or(defaults.otp_ttl),
        }
    }
}

/// Parses a positive count of `unit`s, refusing amounts a `Duration` cannot hold.
fn parse_lifetime(name: &str, value: &str, unit: fn(i64) -> Option<Duration>) -> Result<i64> {
    let amount: i64 = value
        .trim()
        .parse()
        .wrap_err_with(|| format!("Invalid {name} value"))?;
    if amount <= 0 {
        return Err(eyre!("{name} must be positive, got {amount}"));
    }
    unit(amount)
        .ok_or_else(|| eyre!("{amount} is out of range"))
        .wrap_err_with(|| format!("Invalid {name} value"))?;
    Ok(amount)
}

fn parse_log_level(value: &str) -> Level {
    match value.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
