//! Membership entity - a user's seat in a room or group

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;
use crate::value_objects::{ModerationScope, Snowflake};

/// Role held inside one room or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    #[default]
    Member,
    Moderator,
    Admin,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Moderator => "MODERATOR",
            Self::Admin => "ADMIN",
        }
    }

    /// Moderation rights come from the membership, not from the platform role
    #[inline]
    pub fn can_moderate(self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MEMBER" => Ok(Self::Member),
            "MODERATOR" => Ok(Self::Moderator),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new("member role", s)),
        }
    }
}

/// Membership of a user in a room or group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub scope: ModerationScope,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(scope: ModerationScope, user_id: Snowflake, role: MemberRole) -> Self {
        Self {
            scope,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_moderator(&self) -> bool {
        self.role.can_moderate()
    }
}
