//! Notification entity - a per-user inbox item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;
use crate::value_objects::Snowflake;

/// Kind of notification, drives icon/colour on clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
    Event,
    Mentorship,
    Blog,
    Resource,
    Comment,
    Reaction,
    Mention,
    GroupUpdate,
    Moderation,
    System,
    Achievement,
}

impl NotificationType {
    pub const ALL: [NotificationType; 15] = [
        Self::Info,
        Self::Success,
        Self::Warning,
        Self::Error,
        Self::Event,
        Self::Mentorship,
        Self::Blog,
        Self::Resource,
        Self::Comment,
        Self::Reaction,
        Self::Mention,
        Self::GroupUpdate,
        Self::Moderation,
        Self::System,
        Self::Achievement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Event => "EVENT",
            Self::Mentorship => "MENTORSHIP",
            Self::Blog => "BLOG",
            Self::Resource => "RESOURCE",
            Self::Comment => "COMMENT",
            Self::Reaction => "REACTION",
            Self::Mention => "MENTION",
            Self::GroupUpdate => "GROUP_UPDATE",
            Self::Moderation => "MODERATION",
            Self::System => "SYSTEM",
            Self::Achievement => "ACHIEVEMENT",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("notification type", s))
    }
}

/// Notification entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub action_url: Option<String>,
    pub metadata: JsonValue,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create an unread notification
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        kind: NotificationType,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            description: description.into(),
            kind,
            action_url: None,
            metadata: JsonValue::Object(serde_json::Map::new()),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(
            "GROUP_UPDATE".parse::<NotificationType>().unwrap(),
            NotificationType::GroupUpdate
        );
        assert!("group_update".parse::<NotificationType>().is_err());
        assert_eq!(NotificationType::ALL.len(), 15);
    }

    #[test]
    fn test_new_is_unread_with_empty_metadata() {
        let n = Notification::new(
            Snowflake::new(1),
            Snowflake::new(2),
            NotificationType::Warning,
            "Content flagged",
            "Your post was flagged",
        )
        .with_action_url("/groups/4");

        assert!(!n.read);
        assert_eq!(n.metadata, serde_json::json!({}));
        assert_eq!(n.action_url.as_deref(), Some("/groups/4"));

        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "WARNING");
        assert_eq!(json["userId"], "2");
    }
}
