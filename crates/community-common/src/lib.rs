//! # community-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, JwtService, TokenType};
pub use config::{
    AlertsConfig, AppConfig, AppSettings, AuditConfig, ConfigError, ConfigWarning, CorsConfig,
    DatabaseConfig, Environment, JwtConfig, NotificationsConfig, ObservabilityConfig,
    RateLimitConfig, ServerConfig, SnowflakeConfig,
};
pub use error::{domain_status, AppError};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
