//! Room and group database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model shared by the rooms and groups tables
#[derive(Debug, Clone, FromRow)]
pub struct SpaceModel {
    pub id: i64,
    pub name: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Database model for room_members / group_members.
/// Queries alias `room_id` / `group_id` to `space_id`.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipModel {
    pub space_id: i64,
    pub user_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}
