//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{alerts, audit, health, moderation, notifications};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(moderation_routes())
        .merge(notification_routes())
        .merge(audit_routes())
        .merge(admin_routes())
}

/// Moderation routes
fn moderation_routes() -> Router<AppState> {
    Router::new()
        .route("/moderation/flag", post(moderation::flag_content))
        .route(
            "/moderation/mutes",
            post(moderation::mute_user).get(moderation::list_active_mutes),
        )
        .route("/moderation/mutes/status", get(moderation::mute_status))
        .route("/moderation/mutes/:mute_id", delete(moderation::unmute_user))
        .route("/moderation/logs/:target_id", get(moderation::moderation_history))
}

/// Notification inbox and preference routes
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/@me/notification-preferences",
            get(notifications::get_preferences).patch(notifications::update_preferences),
        )
        .route(
            "/notifications",
            get(notifications::list_notifications).delete(notifications::delete_all_notifications),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:notification_id", delete(notifications::delete_notification))
        .route("/notifications/:notification_id/read", patch(notifications::mark_read))
}

/// Audit log routes
fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/audit/logs", get(audit::query_logs))
        .route("/audit/stats", get(audit::stats))
        .route("/audit/cleanup", post(audit::cleanup))
}

/// Admin routes
fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/admin/alerts",
        get(alerts::get_config).patch(alerts::update_config),
    )
}
