//! Audit log database models

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for audit_logs table
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogModel {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource: String,
    pub ip_address: String,
    pub user_agent: String,
    /// `success` or `failure`
    pub result: String,
    pub metadata: JsonValue,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate row of the audit stats query
#[derive(Debug, Clone, FromRow)]
pub struct AuditTotalsModel {
    pub total: i64,
    pub success: i64,
    pub failure: i64,
    pub unique_users: i64,
}

/// `GROUP BY` bucket of the audit stats query
#[derive(Debug, Clone, FromRow)]
pub struct CountedKeyModel {
    pub key: String,
    pub count: i64,
}
