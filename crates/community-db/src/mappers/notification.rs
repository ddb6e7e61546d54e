//! Notification mapper

use community_core::entities::Notification;
use community_core::value_objects::Snowflake;
use community_core::DomainError;

use super::parse_column;
use crate::models::NotificationModel;

impl TryFrom<NotificationModel> for Notification {
    type Error = DomainError;

    fn try_from(model: NotificationModel) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            title: model.title,
            description: model.description,
            kind: parse_column(&model.kind)?,
            action_url: model.action_url,
            metadata: model.metadata,
            read: model.read,
            created_at: model.created_at,
        })
    }
}

/// Notification values ready for binding
pub struct NotificationInsert<'a> {
    pub id: i64,
    pub user_id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub kind: &'static str,
    pub action_url: Option<&'a str>,
}

impl<'a> NotificationInsert<'a> {
    pub fn new(notification: &'a Notification) -> Self {
        Self {
            id: notification.id.into_inner(),
            user_id: notification.user_id.into_inner(),
            title: &notification.title,
            description: &notification.description,
            kind: notification.kind.as_str(),
            action_url: notification.action_url.as_deref(),
        }
    }
}
