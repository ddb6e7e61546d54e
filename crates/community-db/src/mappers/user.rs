//! User entity <-> model mapper

use community_core::entities::User;
use community_core::value_objects::{NotificationPreferences, Snowflake};
use community_core::DomainError;

use super::parse_column;
use crate::models::UserModel;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: Snowflake::new(model.id),
            username: model.username,
            email: model.email,
            role: parse_column(&model.role)?,
            preferences: NotificationPreferences {
                community_comments: model.community_comments,
                community_reactions: model.community_reactions,
                community_mentions: model.community_mentions,
                community_group_updates: model.community_group_updates,
                community_moderation: model.community_moderation,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Convert User entity reference to values for database insertion
pub struct UserInsert<'a> {
    pub id: i64,
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'static str,
    pub preferences: NotificationPreferences,
}

impl<'a> UserInsert<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            id: user.id.into_inner(),
            username: &user.username,
            email: &user.email,
            role: user.role.as_str(),
            preferences: user.preferences,
        }
    }
}
