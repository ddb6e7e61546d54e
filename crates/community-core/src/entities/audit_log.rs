//! Audit log entry - append-only security and compliance record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;
use crate::value_objects::Snowflake;

/// Outcome of an audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditResult {
    Success,
    Failure,
}

impl AuditResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditResult {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            _ => Err(ParseEnumError::new("audit result", s)),
        }
    }
}

/// Well-known audit action names
pub mod audit_actions {
    pub const LOGIN: &str = "LOGIN";
    pub const LOGOUT: &str = "LOGOUT";
    pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
    pub const DATA_ACCESS: &str = "DATA_ACCESS";
    pub const DATA_CREATE: &str = "DATA_CREATE";
    pub const DATA_UPDATE: &str = "DATA_UPDATE";
    pub const DATA_DELETE: &str = "DATA_DELETE";
    pub const SECURITY_EVENT: &str = "SECURITY_EVENT";
    pub const CRITICAL_ERROR: &str = "CRITICAL_ERROR";
}

/// One audited event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Snowflake,
    pub user_id: Option<Snowflake>,
    pub action: String,
    pub resource: String,
    pub ip_address: String,
    pub user_agent: String,
    pub result: AuditResult,
    pub metadata: JsonValue,
    pub timestamp: DateTime<Utc>,
}

/// Filters for audit queries; every field is optional
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub user_id: Option<Snowflake>,
    pub action: Option<String>,
    pub resource: Option<String>,
    pub result: Option<AuditResult>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl AuditLogFilter {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 100;

    /// Clamp paging to sane bounds
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = match self.limit {
            0 => Self::DEFAULT_LIMIT,
            n => n.min(Self::MAX_LIMIT),
        };
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// Aggregate counts over a time window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total: i64,
    pub success: i64,
    pub failure: i64,
    pub unique_users: i64,
    pub top_actions: Vec<CountedKey>,
    pub top_resources: Vec<CountedKey>,
}

/// A value with its frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountedKey {
    pub key: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalization() {
        let filter = AuditLogFilter::default().normalized();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, AuditLogFilter::DEFAULT_LIMIT);
        assert_eq!(filter.offset(), 0);

        let filter = AuditLogFilter {
            page: 3,
            limit: 500,
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.limit, AuditLogFilter::MAX_LIMIT);
        assert_eq!(filter.offset(), 200);
    }

    #[test]
    fn test_result_parse() {
        assert_eq!("failure".parse::<AuditResult>().unwrap(), AuditResult::Failure);
        assert_eq!(AuditResult::from_success(true), AuditResult::Success);
        assert!("FAILURE".parse::<AuditResult>().is_err());
    }
}
