//! User entity - a community member account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;
use crate::value_objects::{NotificationCategory, NotificationPreferences, Snowflake};

/// Platform-wide role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Member,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Moderator => "MODERATOR",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MEMBER" => Ok(Self::Member),
            "MODERATOR" => Ok(Self::Moderator),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new("user role", s)),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new member account with default preferences
    pub fn new(id: Snowflake, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            role: UserRole::Member,
            preferences: NotificationPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether the user accepts notifications of this category
    #[inline]
    pub fn wants(&self, category: NotificationCategory) -> bool {
        self.preferences.allows(category)
    }

    pub fn set_preferences(&mut self, preferences: NotificationPreferences) {
        self.preferences = preferences;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(Snowflake::new(1), "ada".into(), "ada@example.com".into());
        assert_eq!(user.role, UserRole::Member);
        assert!(!user.is_admin());
        assert!(user.wants(NotificationCategory::CommunityComments));
    }

    #[test]
    fn test_set_preferences_bumps_updated_at() {
        let mut user = User::new(Snowflake::new(1), "ada".into(), "ada@example.com".into());
        let before = user.updated_at;
        let mut prefs = user.preferences;
        prefs.community_mentions = false;

        user.set_preferences(prefs);

        assert!(!user.wants(NotificationCategory::CommunityMentions));
        assert!(user.updated_at >= before);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("admin".parse::<UserRole>().is_err());
    }
}
