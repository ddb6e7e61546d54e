//! Moderation scope - the room or group a moderation decision applies to

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Which kind of community space a scope points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Room,
    Group,
}

impl ScopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Group => "group",
        }
    }
}

/// A room or a group, never both and never neither.
///
/// Untrusted input arrives as a pair of optional ids and goes through
/// [`ModerationScope::from_parts`] before anything touches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ModerationScope {
    Room(Snowflake),
    Group(Snowflake),
}

impl ModerationScope {
    /// Build a scope from the optional `room_id` / `group_id` pair of a request.
    pub fn from_parts(
        room_id: Option<Snowflake>,
        group_id: Option<Snowflake>,
    ) -> Result<Self, DomainError> {
        match (room_id, group_id) {
            (Some(room), None) => Ok(Self::Room(room)),
            (None, Some(group)) => Ok(Self::Group(group)),
            (Some(_), Some(_)) => Err(DomainError::ValidationError(
                "Specify either roomId or groupId, not both".to_string(),
            )),
            (None, None) => Err(DomainError::ValidationError(
                "Either roomId or groupId is required".to_string(),
            )),
        }
    }

    #[inline]
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::Room(_) => ScopeKind::Room,
            Self::Group(_) => ScopeKind::Group,
        }
    }

    #[inline]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Room(id) | Self::Group(id) => *id,
        }
    }

    pub fn room_id(&self) -> Option<Snowflake> {
        match self {
            Self::Room(id) => Some(*id),
            Self::Group(_) => None,
        }
    }

    pub fn group_id(&self) -> Option<Snowflake> {
        match self {
            Self::Group(id) => Some(*id),
            Self::Room(_) => None,
        }
    }

    /// Scope as a JSON object with `roomId` or `groupId`, for log metadata
    pub fn to_metadata(&self) -> serde_json::Value {
        match self {
            Self::Room(id) => serde_json::json!({ "roomId": id }),
            Self::Group(id) => serde_json::json!({ "groupId": id }),
        }
    }
}

impl fmt::Display for ModerationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.id())
    }
}
