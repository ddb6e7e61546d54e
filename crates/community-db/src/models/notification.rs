//! Notification database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for notifications table
#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub action_url: Option<String>,
    pub metadata: JsonValue,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
