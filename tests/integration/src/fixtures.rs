//! Test fixtures and data generators
//!
//! Request bodies as the API expects them and the response shapes the tests
//! read back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagContentRequest {
    pub content_id: String,
    pub content_type: &'static str,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteUserRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub duration_minutes: i64,
    pub reason: Option<String>,
}

impl MuteUserRequest {
    pub fn in_room(user_id: impl ToString, room_id: impl ToString, minutes: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            room_id: Some(room_id.to_string()),
            group_id: None,
            duration_minutes: minutes,
            reason: Some("spamming".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationLogResponse {
    pub id: String,
    pub moderator_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub action: String,
    pub reason: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteResponse {
    pub id: String,
    pub user_id: String,
    pub scope: Value,
    pub muted_by: String,
    pub reason: Option<String>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MuteOutcomeResponse {
    pub mute: MuteResponse,
    pub extended: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteStatusResponse {
    pub user_id: String,
    pub muted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub action_url: Option<String>,
    pub read: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct AffectedResponse {
    pub affected: u64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub community_comments: bool,
    pub community_reactions: bool,
    pub community_mentions: bool,
    pub community_group_updates: bool,
    pub community_moderation: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPageResponse {
    pub entries: Vec<Value>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
