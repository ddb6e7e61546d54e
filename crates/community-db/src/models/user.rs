//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// `MEMBER`, `MODERATOR` or `ADMIN`
    pub role: String,
    pub community_comments: bool,
    pub community_reactions: bool,
    pub community_mentions: bool,
    pub community_group_updates: bool,
    pub community_moderation: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
