//! Configuration structs

mod app_config;

pub use app_config::{
    parse_alert_channels, parse_min_severity, AlertsConfig, AppConfig, AppSettings, AuditConfig,
    ConfigError, ConfigWarning, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    NotificationsConfig, ObservabilityConfig, RateLimitConfig, ServerConfig, SnowflakeConfig,
};
