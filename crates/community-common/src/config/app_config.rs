//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::time::Duration;

use chrono::{DateTime, Utc};

use community_core::{AlertChannelKind, Severity};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub alerts: AlertsConfig,
    pub notifications: NotificationsConfig,
    pub observability: ObservabilityConfig,
    pub audit: AuditConfig,
    /// Values that were read but ignored; log them after tracing is up
    #[serde(skip)]
    pub warnings: Vec<ConfigWarning>,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration. Tokens are minted by the identity service sharing the secret.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Alert routing configuration, read once at startup and mutable at runtime
/// through the alert dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_alert_channels")]
    pub channels: Vec<AlertChannelKind>,
    #[serde(default)]
    pub email_recipients: Vec<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channels: default_alert_channels(),
            email_recipients: Vec::new(),
            webhook_url: None,
            min_severity: default_min_severity(),
        }
    }
}

/// Notification behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Whether the preference gate lets notifications through when the
    /// user's flags cannot be read
    #[serde(default = "default_true")]
    pub preference_fail_open: bool,
}

/// Request observability thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_slow_request_threshold_ms")]
    pub slow_request_threshold_ms: u64,
}

impl ObservabilityConfig {
    #[must_use]
    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_threshold_ms)
    }
}

/// Longest retention window accepted from config or a cleanup request
const MAX_RETENTION_DAYS: u32 = 3650;

/// Audit retention
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_retention_days")]
    pub retention_days: u32,
}

impl AuditConfig {
    /// Oldest timestamp kept by a `days` retention, or `None` when the
    /// window falls outside the representable range
    #[must_use]
    pub fn retention_cutoff(days: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        chrono::Duration::try_days(i64::from(days)).and_then(|window| now.checked_sub_signed(window))
    }
}

// Default value functions
fn default_app_name() -> String {
    "community-api".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_alert_channels() -> Vec<AlertChannelKind> {
    vec![AlertChannelKind::Console]
}

fn default_min_severity() -> Severity {
    Severity::Critical
}

fn default_true() -> bool {
    true
}

fn default_slow_request_threshold_ms() -> u64 {
    3000
}

fn default_audit_retention_days() -> u32 {
    90
}

/// Split a comma-separated list, dropping blanks
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Lenient boolean: `true/1/yes/on` and `false/0/no/off`, case-insensitive
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A setting that was present but could not be used. Collected while
/// loading so it can be logged once the subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigWarning {
    fn new(key: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            key,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn log(&self) {
        tracing::warn!(key = self.key, value = %self.value, reason = %self.reason, "Ignoring configuration value");
    }
}

/// Parse `ALERT_CHANNELS`. Unknown names are skipped and reported; an
/// empty result falls back to the console channel.
pub fn parse_alert_channels(raw: &str, warnings: &mut Vec<ConfigWarning>) -> Vec<AlertChannelKind> {
    let mut channels = Vec::new();
    for name in split_list(raw) {
        match name.parse::<AlertChannelKind>() {
            Ok(kind) if !channels.contains(&kind) => channels.push(kind),
            Ok(_) => {}
            Err(e) => warnings.push(ConfigWarning::new("ALERT_CHANNELS", name, e)),
        }
    }
    if channels.is_empty() {
        channels = default_alert_channels();
    }
    channels
}

/// Parse `ALERT_MIN_SEVERITY`, falling back to `critical` on garbage
pub fn parse_min_severity(raw: &str, warnings: &mut Vec<ConfigWarning>) -> Severity {
    raw.parse().unwrap_or_else(|e| {
        warnings.push(ConfigWarning::new("ALERT_MIN_SEVERITY", raw, e));
        default_min_severity()
    })
}

fn check_retention_days(days: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_RETENTION_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::InvalidValue("AUDIT_RETENTION_DAYS", days.to_string()))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

impl AlertsConfig {
    /// Build from the `ALERT*` environment variables. Unusable values are
    /// pushed onto `warnings`.
    pub fn from_env(warnings: &mut Vec<ConfigWarning>) -> Self {
        Self {
            enabled: env::var("ALERTS_ENABLED")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(false),
            channels: env::var("ALERT_CHANNELS")
                .map(|s| parse_alert_channels(&s, warnings))
                .unwrap_or_else(|_| default_alert_channels()),
            email_recipients: env::var("ALERT_EMAIL_RECIPIENTS")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            webhook_url: env::var("ALERT_WEBHOOK_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            min_severity: env::var("ALERT_MIN_SEVERITY")
                .map(|s| parse_min_severity(&s, warnings))
                .unwrap_or_else(|_| default_min_severity()),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let worker_id: u16 = env_parse("WORKER_ID").unwrap_or(0);
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue("WORKER_ID", worker_id.to_string()));
        }

        let retention_days = check_retention_days(
            env_parse("AUDIT_RETENTION_DAYS").unwrap_or_else(default_audit_retention_days),
        )?;

        let mut warnings = Vec::new();
        let alerts = AlertsConfig::from_env(&mut warnings);

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: env_parse("API_PORT").ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(default_max_connections),
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(default_min_connections),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: env_parse("JWT_ACCESS_TOKEN_EXPIRY")
                    .unwrap_or_else(default_access_token_expiry),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: env_parse("RATE_LIMIT_REQUESTS_PER_SECOND")
                    .unwrap_or_else(default_requests_per_second),
                burst: env_parse("RATE_LIMIT_BURST").unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| split_list(&s))
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
            alerts,
            notifications: NotificationsConfig {
                preference_fail_open: env::var("NOTIFICATION_PREFERENCE_FAIL_OPEN")
                    .ok()
                    .and_then(|s| parse_bool(&s))
                    .unwrap_or_else(default_true),
            },
            observability: ObservabilityConfig {
                slow_request_threshold_ms: env_parse("SLOW_REQUEST_THRESHOLD_MS")
                    .unwrap_or_else(default_slow_request_threshold_ms),
            },
            audit: AuditConfig { retention_days },
            warnings,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
