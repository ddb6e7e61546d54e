//! Moderation log and mute mappers

use chrono::{DateTime, Utc};
use community_core::entities::{ModerationLog, UserMute};
use community_core::value_objects::{ModerationScope, Snowflake};
use community_core::DomainError;

use super::parse_column;
use crate::models::{ModerationLogModel, UserMuteModel};

impl TryFrom<ModerationLogModel> for ModerationLog {
    type Error = DomainError;

    fn try_from(model: ModerationLogModel) -> Result<Self, Self::Error> {
        Ok(ModerationLog {
            id: Snowflake::new(model.id),
            moderator_id: Snowflake::new(model.moderator_id),
            target_id: Snowflake::new(model.target_id),
            action: parse_column(&model.action)?,
            reason: model.reason,
            metadata: model.metadata,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<UserMuteModel> for UserMute {
    type Error = DomainError;

    fn try_from(model: UserMuteModel) -> Result<Self, Self::Error> {
        let scope = ModerationScope::from_parts(
            model.room_id.map(Snowflake::new),
            model.group_id.map(Snowflake::new),
        )
        .map_err(|_| DomainError::DatabaseError(format!("corrupt row: mute {} scope", model.id)))?;

        Ok(UserMute {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            scope,
            muted_by: Snowflake::new(model.muted_by),
            reason: model.reason,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}

/// Mute values with the scope split into its two nullable columns
pub struct UserMuteInsert<'a> {
    pub id: i64,
    pub user_id: i64,
    pub room_id: Option<i64>,
    pub group_id: Option<i64>,
    pub muted_by: i64,
    pub reason: Option<&'a str>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl<'a> UserMuteInsert<'a> {
    pub fn new(mute: &'a UserMute) -> Self {
        Self {
            id: mute.id.into_inner(),
            user_id: mute.user_id.into_inner(),
            room_id: mute.scope.room_id().map(Snowflake::into_inner),
            group_id: mute.scope.group_id().map(Snowflake::into_inner),
            muted_by: mute.muted_by.into_inner(),
            reason: mute.reason.as_deref(),
            expires_at: mute.expires_at,
            created_at: mute.created_at,
        }
    }
}
