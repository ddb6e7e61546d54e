//! Moderation log entry - the append-only trail of moderator decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;
use crate::value_objects::Snowflake;

/// Kind of moderation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationAction {
    ContentFlag,
    UserMute,
    UserUnmute,
    UserKick,
    PostPin,
    PostUnpin,
    MessageDelete,
    PostDelete,
}

impl ModerationAction {
    pub const ALL: [ModerationAction; 8] = [
        Self::ContentFlag,
        Self::UserMute,
        Self::UserUnmute,
        Self::UserKick,
        Self::PostPin,
        Self::PostUnpin,
        Self::MessageDelete,
        Self::PostDelete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContentFlag => "CONTENT_FLAG",
            Self::UserMute => "USER_MUTE",
            Self::UserUnmute => "USER_UNMUTE",
            Self::UserKick => "USER_KICK",
            Self::PostPin => "POST_PIN",
            Self::PostUnpin => "POST_UNPIN",
            Self::MessageDelete => "MESSAGE_DELETE",
            Self::PostDelete => "POST_DELETE",
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("moderation action", s))
    }
}

/// One moderation decision. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationLog {
    pub id: Snowflake,
    pub moderator_id: Snowflake,
    pub target_id: Snowflake,
    #[serde(rename = "type")]
    pub action: ModerationAction,
    pub reason: Option<String>,
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl ModerationLog {
    pub fn new(
        id: Snowflake,
        action: ModerationAction,
        moderator_id: Snowflake,
        target_id: Snowflake,
        reason: Option<String>,
        metadata: JsonValue,
    ) -> Self {
        Self {
            id,
            moderator_id,
            target_id,
            action,
            reason,
            metadata,
            created_at: Utc::now(),
        }
    }
}
