//! Post and message database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for posts table
#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: i64,
    pub group_id: Option<i64>,
    pub author_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub room_id: Option<i64>,
    pub group_id: Option<i64>,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
