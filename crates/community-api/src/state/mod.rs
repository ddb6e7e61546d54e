//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context and configuration.

use std::sync::Arc;

use community_common::{AppConfig, JwtService};
use community_db::PgPool;
use community_service::{AlertDispatcher, ServiceContext};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Application configuration
    config: Arc<AppConfig>,
    /// Validates bearer tokens minted by the identity service
    jwt_service: Arc<JwtService>,
    /// Kept for the readiness probe
    pool: PgPool,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        jwt_service: Arc<JwtService>,
        pool: PgPool,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            jwt_service,
            pool,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn alerts(&self) -> &AlertDispatcher {
        self.service_context.alerts()
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .finish()
    }
}
