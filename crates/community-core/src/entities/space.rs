//! Community spaces - chat rooms and discussion groups

use chrono::{DateTime, Utc};

use crate::value_objects::{ModerationScope, Snowflake};

/// Discussion room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: Snowflake,
    pub name: String,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(id: Snowflake, name: String, created_by: Snowflake) -> Self {
        Self {
            id,
            name,
            created_by,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn scope(&self) -> ModerationScope {
        ModerationScope::Room(self.id)
    }
}

/// Community group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: Snowflake,
    pub name: String,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: Snowflake, name: String, created_by: Snowflake) -> Self {
        Self {
            id,
            name,
            created_by,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn scope(&self) -> ModerationScope {
        ModerationScope::Group(self.id)
    }
}
