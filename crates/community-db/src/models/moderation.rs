//! Moderation log and mute database models

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for moderation_logs table
#[derive(Debug, Clone, FromRow)]
pub struct ModerationLogModel {
    pub id: i64,
    pub moderator_id: i64,
    pub target_id: i64,
    #[sqlx(rename = "type")]
    pub action: String,
    pub reason: Option<String>,
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// Database model for user_mutes table
#[derive(Debug, Clone, FromRow)]
pub struct UserMuteModel {
    pub id: i64,
    pub user_id: i64,
    pub room_id: Option<i64>,
    pub group_id: Option<i64>,
    pub muted_by: i64,
    pub reason: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
