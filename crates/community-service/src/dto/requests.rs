//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Bodies and query strings use camelCase keys; ids are accepted as strings
//! or integers.

use chrono::{DateTime, Utc};
use community_core::{
    AlertChannelKind, AuditLogFilter, AuditResult, ContentType, NotificationPreferences, Severity,
    Snowflake,
};
use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidateUrl, ValidationError};

use crate::alerting::AlertsConfigUpdate;
use crate::services::moderation::MuteCommand;

// ============================================================================
// Moderation Requests
// ============================================================================

/// Flag a post or message
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FlagContentRequest {
    pub content_id: Snowflake,

    pub content_type: ContentType,

    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Mute a user in exactly one room or group
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MuteUserRequest {
    pub user_id: Snowflake,

    pub room_id: Option<Snowflake>,

    pub group_id: Option<Snowflake>,

    #[validate(range(min = 1, max = 525_600, message = "Duration must be 1-525600 minutes"))]
    pub duration_minutes: i64,

    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

impl MuteUserRequest {
    pub fn into_command(self, moderator_id: Snowflake) -> MuteCommand {
        MuteCommand {
            user_id: self.user_id,
            room_id: self.room_id,
            group_id: self.group_id,
            moderator_id,
            duration_minutes: self.duration_minutes,
            reason: self.reason,
        }
    }
}

/// `?roomId=` or `?groupId=`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub room_id: Option<Snowflake>,
    pub group_id: Option<Snowflake>,
}

/// Mute status lookup
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MuteStatusQuery {
    pub user_id: Snowflake,
    pub room_id: Option<Snowflake>,
    pub group_id: Option<Snowflake>,
}

/// Moderation history paging
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<i64>,
}

// ============================================================================
// Notification Requests
// ============================================================================

/// Inbox paging
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must not be negative"))]
    pub offset: Option<i64>,
}

/// Partial update of notification preferences
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub community_comments: Option<bool>,
    pub community_reactions: Option<bool>,
    pub community_mentions: Option<bool>,
    pub community_group_updates: Option<bool>,
    pub community_moderation: Option<bool>,
}

impl UpdatePreferencesRequest {
    /// Overwrite only the flags present in the request
    pub fn apply(&self, preferences: &mut NotificationPreferences) {
        let updates = [
            (self.community_comments, &mut preferences.community_comments),
            (self.community_reactions, &mut preferences.community_reactions),
            (self.community_mentions, &mut preferences.community_mentions),
            (self.community_group_updates, &mut preferences.community_group_updates),
            (self.community_moderation, &mut preferences.community_moderation),
        ];
        for (value, flag) in updates {
            if let Some(value) = value {
                *flag = value;
            }
        }
    }
}

// ============================================================================
// Audit Requests
// ============================================================================

/// Audit log search
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub user_id: Option<Snowflake>,
    pub action: Option<String>,
    pub resource: Option<String>,
    pub result: Option<AuditResult>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "Page starts at 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<u32>,
}

impl From<AuditLogQuery> for AuditLogFilter {
    fn from(query: AuditLogQuery) -> Self {
        Self {
            user_id: query.user_id,
            action: query.action,
            resource: query.resource,
            result: query.result,
            start_date: query.start_date,
            end_date: query.end_date,
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(AuditLogFilter::DEFAULT_LIMIT),
        }
    }
}

/// Window for audit statistics
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuditStatsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Retention cleanup; defaults to the configured retention
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuditCleanupRequest {
    #[validate(range(min = 1, max = 3650, message = "Retention must be 1-3650 days"))]
    pub older_than_days: Option<u32>,
}

// ============================================================================
// Alert Configuration Requests
// ============================================================================

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_alert_update(request: &UpdateAlertConfigRequest) -> Result<(), ValidationError> {
    if let Some(recipients) = &request.email_recipients {
        if recipients.iter().any(|r| !r.validate_email()) {
            return Err(ValidationError::new("email_recipients")
                .with_message("Every recipient must be an email address".into()));
        }
    }
    if let Some(Some(url)) = &request.webhook_url {
        if !url.validate_url() {
            return Err(ValidationError::new("webhook_url")
                .with_message("Webhook URL must be a valid URL".into()));
        }
    }
    Ok(())
}

/// Runtime change of alert routing; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_alert_update"))]
pub struct UpdateAlertConfigRequest {
    pub enabled: Option<bool>,
    pub channels: Option<Vec<AlertChannelKind>>,
    pub email_recipients: Option<Vec<String>>,
    /// `null` clears the URL
    #[serde(default, deserialize_with = "double_option")]
    pub webhook_url: Option<Option<String>>,
    pub min_severity: Option<Severity>,
}

impl From<UpdateAlertConfigRequest> for AlertsConfigUpdate {
    fn from(request: UpdateAlertConfigRequest) -> Self {
        Self {
            enabled: request.enabled,
            channels: request.channels,
            email_recipients: request.email_recipients,
            webhook_url: request.webhook_url,
            min_severity: request.min_severity,
        }
    }
}
