//! User mute - a time-boxed posting restriction in one room or group

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::{ModerationScope, Snowflake};

/// Mute record. Only meaningful while `expires_at` is in the future;
/// expired rows may linger and must be read as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMute {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub scope: ModerationScope,
    pub muted_by: Snowflake,
    pub reason: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl UserMute {
    #[inline]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.expires_at > at
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Push the expiry out and take over the new moderator's reason
    pub fn extend(&mut self, expires_at: DateTime<Utc>, muted_by: Snowflake, reason: Option<String>) {
        self.expires_at = expires_at;
        self.muted_by = muted_by;
        self.reason = reason;
    }
}
