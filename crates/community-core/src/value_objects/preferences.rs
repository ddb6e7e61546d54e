//! Per-user notification preference flags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of social notification a user can opt out of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    CommunityComments,
    CommunityReactions,
    CommunityMentions,
    CommunityGroupUpdates,
    CommunityModeration,
}

impl NotificationCategory {
    /// Column name of the flag on the users table
    pub fn column(self) -> &'static str {
        match self {
            Self::CommunityComments => "community_comments",
            Self::CommunityReactions => "community_reactions",
            Self::CommunityMentions => "community_mentions",
            Self::CommunityGroupUpdates => "community_group_updates",
            Self::CommunityModeration => "community_moderation",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Boolean opt-in flags stored on the user record. New users get everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub community_comments: bool,
    pub community_reactions: bool,
    pub community_mentions: bool,
    pub community_group_updates: bool,
    pub community_moderation: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            community_comments: true,
            community_reactions: true,
            community_mentions: true,
            community_group_updates: true,
            community_moderation: true,
        }
    }
}

impl NotificationPreferences {
    /// Whether notifications of this category may be created
    pub fn allows(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::CommunityComments => self.community_comments,
            NotificationCategory::CommunityReactions => self.community_reactions,
            NotificationCategory::CommunityMentions => self.community_mentions,
            NotificationCategory::CommunityGroupUpdates => self.community_group_updates,
            NotificationCategory::CommunityModeration => self.community_moderation,
        }
    }

    pub fn set(&mut self, category: NotificationCategory, enabled: bool) {
        let flag = match category {
            NotificationCategory::CommunityComments => &mut self.community_comments,
            NotificationCategory::CommunityReactions => &mut self.community_reactions,
            NotificationCategory::CommunityMentions => &mut self.community_mentions,
            NotificationCategory::CommunityGroupUpdates => &mut self.community_group_updates,
            NotificationCategory::CommunityModeration => &mut self.community_moderation,
        };
        *flag = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_everything() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.allows(NotificationCategory::CommunityComments));
        assert!(prefs.allows(NotificationCategory::CommunityModeration));
    }

    #[test]
    fn test_set_only_touches_one_flag() {
        let mut prefs = NotificationPreferences::default();
        prefs.set(NotificationCategory::CommunityReactions, false);

        assert!(!prefs.allows(NotificationCategory::CommunityReactions));
        assert!(prefs.allows(NotificationCategory::CommunityComments));
        assert!(prefs.allows(NotificationCategory::CommunityMentions));
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(NotificationPreferences::default()).unwrap();
        assert_eq!(json["communityGroupUpdates"], true);

        let category: NotificationCategory =
            serde_json::from_str("\"communityMentions\"").unwrap();
        assert_eq!(category, NotificationCategory::CommunityMentions);
    }
}
