//! Error log entries and the channel-agnostic alert payload built from them

use chrono::{DateTime, Utc};
use community_common::Environment;
use community_core::{Severity, Snowflake};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// One classified error occurrence. Transient: written to the log sink,
/// and for critical entries mirrored into the audit trail and alerted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorLogEntry {
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            error: None,
            context: None,
            request_id: None,
            user_id: None,
            ip_address: None,
            user_agent: None,
            endpoint: None,
            method: None,
            timestamp: Utc::now(),
        }
    }
}

/// What every alert channel receives.
///
/// This is also the JSON body POSTed by the webhook channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub environment: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonValue>,
}

impl AlertPayload {
    /// Build a payload. Error details never leave the process in production.
    pub fn from_entry(entry: &ErrorLogEntry, environment: Environment) -> Self {
        Self {
            severity: entry.severity,
            code: entry.code.clone(),
            message: entry.message.clone(),
            timestamp: entry.timestamp,
            environment: environment.as_str(),
            request_id: entry.request_id.clone(),
            user_id: entry.user_id,
            endpoint: entry.endpoint.clone(),
            method: entry.method.clone(),
            error: if environment.is_production() {
                None
            } else {
                entry.error.clone()
            },
            context: entry.context.clone(),
        }
    }

    /// One-line summary used for email subjects
    pub fn subject(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.severity.as_str().to_uppercase(),
            self.code,
            self.message
        )
    }
}
