//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use community_core::{AlertChannelKind, Notification, Severity, Snowflake};
use serde::Serialize;

// ============================================================================
// Notification Responses
// ============================================================================

/// One inbox page with the user's total unread count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Number of rows a bulk operation touched
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AffectedResponse {
    pub affected: u64,
}

// ============================================================================
// Moderation Responses
// ============================================================================

/// Whether a user is muted in a scope right now
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteStatusResponse {
    pub user_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Snowflake>,
    pub muted: bool,
}

// ============================================================================
// Audit Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub removed: u64,
    pub cutoff: DateTime<Utc>,
}

// ============================================================================
// Alert Responses
// ============================================================================

/// Current alert routing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfigResponse {
    pub enabled: bool,
    pub channels: Vec<AlertChannelKind>,
    pub email_recipients: Vec<String>,
    pub webhook_url: Option<String>,
    pub min_severity: Severity,
    pub environment: &'static str,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
