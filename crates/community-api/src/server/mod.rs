//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use community_common::{AppConfig, AppError, JwtService};
use community_core::SnowflakeGenerator;
use community_db::{
    create_pool, run_migrations, PgAuditLogRepository, PgGroupRepository, PgMembershipRepository,
    PgMessageRepository, PgModerationLogRepository, PgMuteRepository, PgNotificationRepository,
    PgPostRepository, PgRoomRepository, PgUserRepository,
};
use community_service::{AlertDispatcher, ServiceContextBuilder, ServiceSettings};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Health probes sit outside the middleware stack so they are never rate
/// limited.
pub fn create_app(state: AppState) -> Router {
    let api = apply_middleware(create_router(), &state);
    health_routes().merge(api).with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = community_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;
    info!("PostgreSQL connection established");

    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Migration failed: {e}")))?;

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));

    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let alerts = Arc::new(AlertDispatcher::new(config.alerts.clone(), config.app.env));
    info!(
        enabled = config.alerts.enabled,
        channels = ?config.alerts.channels,
        min_severity = ?config.alerts.min_severity,
        "Alert dispatcher configured"
    );

    let service_context = ServiceContextBuilder::new()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .room_repo(Arc::new(PgRoomRepository::new(pool.clone())))
        .group_repo(Arc::new(PgGroupRepository::new(pool.clone())))
        .membership_repo(Arc::new(PgMembershipRepository::new(pool.clone())))
        .post_repo(Arc::new(PgPostRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .moderation_log_repo(Arc::new(PgModerationLogRepository::new(pool.clone())))
        .mute_repo(Arc::new(PgMuteRepository::new(pool.clone())))
        .audit_log_repo(Arc::new(PgAuditLogRepository::new(pool.clone())))
        .notification_repo(Arc::new(PgNotificationRepository::new(pool.clone())))
        .snowflake_generator(snowflake_generator)
        .alerts(alerts)
        .settings(ServiceSettings {
            environment: config.app.env,
            preference_fail_open: config.notifications.preference_fail_open,
        })
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, jwt_service, pool))
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
