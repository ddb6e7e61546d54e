//! Audit service
//!
//! Append-only trail of security-relevant actions. Writing never fails the
//! caller: a storage error dumps the entry to the log instead.

use chrono::{DateTime, Utc};
use community_core::{
    audit_actions, AuditLogEntry, AuditLogFilter, AuditResult, AuditStats, Snowflake,
};
use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::{error, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::request_meta::{RequestMeta, UNKNOWN};

/// An audit event before it is given an id and timestamp
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub user_id: Option<Snowflake>,
    pub action: String,
    pub resource: String,
    pub ip_address: String,
    pub user_agent: String,
    pub result: AuditResult,
    pub metadata: JsonValue,
}

impl AuditRecord {
    pub fn new(action: impl Into<String>, resource: impl Into<String>, result: AuditResult) -> Self {
        Self {
            user_id: None,
            action: action.into(),
            resource: resource.into(),
            ip_address: UNKNOWN.to_string(),
            user_agent: UNKNOWN.to_string(),
            result,
            metadata: JsonValue::Object(Map::new()),
        }
    }
}

/// Kind of data modification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOperation {
    Create,
    Update,
    Delete,
}

impl DataOperation {
    pub fn action(self) -> &'static str {
        match self {
            Self::Create => audit_actions::DATA_CREATE,
            Self::Update => audit_actions::DATA_UPDATE,
            Self::Delete => audit_actions::DATA_DELETE,
        }
    }
}

/// One page of audit entries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    pub entries: Vec<AuditLogEntry>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

/// Audit service
pub struct AuditService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuditService<'a> {
    /// Create a new AuditService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Append one entry. Returns the stored entry, or `None` if the store
    /// rejected it (the entry is then written to the log).
    #[instrument(skip(self, record), fields(action = %record.action))]
    pub async fn log(&self, record: AuditRecord) -> Option<AuditLogEntry> {
        let entry = AuditLogEntry {
            id: self.ctx.generate_id(),
            user_id: record.user_id,
            action: record.action,
            resource: record.resource,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
            result: record.result,
            metadata: record.metadata,
            timestamp: Utc::now(),
        };

        match self.ctx.audit_log_repo().append(&entry).await {
            Ok(()) => Some(entry),
            Err(e) => {
                let dump = serde_json::to_string(&entry).unwrap_or_else(|_| format!("{entry:?}"));
                error!(error = %e, entry = %dump, "Failed to write audit log entry");
                None
            }
        }
    }

    /// Record an event with client metadata taken from the request
    pub async fn log_from_request(
        &self,
        meta: &RequestMeta,
        action: &str,
        resource: &str,
        result: AuditResult,
        user_id: Option<Snowflake>,
        metadata: Option<JsonValue>,
    ) -> Option<AuditLogEntry> {
        let mut record = AuditRecord::new(action, resource, result);
        record.user_id = user_id;
        record.ip_address.clone_from(&meta.ip_address);
        record.user_agent.clone_from(&meta.user_agent);
        record.metadata = with_request_fields(metadata, meta);
        self.log(record).await
    }

    /// Login, logout, token refresh and similar
    pub async fn log_auth(
        &self,
        meta: &RequestMeta,
        action: &str,
        user_id: Option<Snowflake>,
        success: bool,
        metadata: Option<JsonValue>,
    ) -> Option<AuditLogEntry> {
        self.log_from_request(
            meta,
            action,
            "auth",
            AuditResult::from_success(success),
            user_id,
            metadata,
        )
        .await
    }

    /// A caller was refused access to a resource
    pub async fn log_authorization_failure(
        &self,
        meta: &RequestMeta,
        user_id: Option<Snowflake>,
        resource: &str,
        reason: &str,
    ) -> Option<AuditLogEntry> {
        self.log_from_request(
            meta,
            audit_actions::ACCESS_DENIED,
            resource,
            AuditResult::Failure,
            user_id,
            Some(json!({ "reason": reason })),
        )
        .await
    }

    pub async fn log_data_access(
        &self,
        meta: &RequestMeta,
        user_id: Snowflake,
        resource: &str,
        metadata: Option<JsonValue>,
    ) -> Option<AuditLogEntry> {
        self.log_from_request(
            meta,
            audit_actions::DATA_ACCESS,
            resource,
            AuditResult::Success,
            Some(user_id),
            metadata,
        )
        .await
    }

    pub async fn log_data_modification(
        &self,
        meta: &RequestMeta,
        user_id: Snowflake,
        operation: DataOperation,
        resource: &str,
        metadata: Option<JsonValue>,
    ) -> Option<AuditLogEntry> {
        self.log_from_request(
            meta,
            operation.action(),
            resource,
            AuditResult::Success,
            Some(user_id),
            metadata,
        )
        .await
    }

    /// Generic security event, named in the metadata
    pub async fn log_security_event(
        &self,
        meta: &RequestMeta,
        event: &str,
        user_id: Option<Snowflake>,
        success: bool,
        metadata: Option<JsonValue>,
    ) -> Option<AuditLogEntry> {
        let mut metadata = into_object(metadata);
        metadata.insert("event".to_string(), JsonValue::String(event.to_string()));
        self.log_from_request(
            meta,
            audit_actions::SECURITY_EVENT,
            "security",
            AuditResult::from_success(success),
            user_id,
            Some(JsonValue::Object(metadata)),
        )
        .await
    }

    /// Page of matching entries, newest first
    #[instrument(skip(self))]
    pub async fn query(&self, filter: AuditLogFilter) -> ServiceResult<AuditPage> {
        let filter = filter.normalized();
        let (entries, total) = self.ctx.audit_log_repo().query(&filter).await?;
        let limit = i64::from(filter.limit);

        Ok(AuditPage {
            entries,
            total,
            page: filter.page,
            limit: filter.limit,
            total_pages: (total + limit - 1) / limit,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_stats(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> ServiceResult<AuditStats> {
        Ok(self.ctx.audit_log_repo().stats(start, end).await?)
    }

    /// Retention cleanup. Storage errors are logged and reported as zero.
    #[instrument(skip(self))]
    pub async fn cleanup(&self, older_than: DateTime<Utc>) -> u64 {
        match self.ctx.audit_log_repo().delete_older_than(older_than).await {
            Ok(removed) => {
                info!(removed, cutoff = %older_than, "Audit log cleanup finished");
                removed
            }
            Err(e) => {
                error!(error = %e, cutoff = %older_than, "Audit log cleanup failed");
                0
            }
        }
    }
}

fn into_object(metadata: Option<JsonValue>) -> Map<String, JsonValue> {
    match metadata {
        Some(JsonValue::Object(map)) => map,
        Some(JsonValue::Null) | None => Map::new(),
        Some(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Caller metadata plus request id, method and endpoint when known
fn with_request_fields(metadata: Option<JsonValue>, meta: &RequestMeta) -> JsonValue {
    let mut map = into_object(metadata);
    let fields = [
        ("requestId", &meta.request_id),
        ("method", &meta.method),
        ("endpoint", &meta.endpoint),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            map.entry(key)
                .or_insert_with(|| JsonValue::String(value.clone()));
        }
    }
    JsonValue::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;
    use chrono::Duration;

    fn meta() -> RequestMeta {
        RequestMeta::from_headers(|name| match name {
            "x-forwarded-for" => Some("203.0.113.9, 10.0.0.1".to_string()),
            "user-agent" => Some("test-agent".to_string()),
            "x-request-id" => Some("req-7".to_string()),
            _ => None,
        })
        .with_route("POST", "/api/v1/moderation/mutes")
    }

    #[tokio::test]
    async fn test_log_from_request_captures_client() {
        let h = TestHarness::new();
        let audit = AuditService::new(&h.ctx);

        let entry = audit
            .log_authorization_failure(&meta(), Some(Snowflake::new(5)), "moderation", "not a moderator")
            .await
            .unwrap();

        assert_eq!(entry.action, audit_actions::ACCESS_DENIED);
        assert_eq!(entry.result, AuditResult::Failure);
        assert_eq!(entry.ip_address, "203.0.113.9");
        assert_eq!(entry.user_agent, "test-agent");
        assert_eq!(entry.metadata["reason"], "not a moderator");
        assert_eq!(entry.metadata["requestId"], "req-7");
        assert_eq!(entry.metadata["endpoint"], "/api/v1/moderation/mutes");
        assert_eq!(h.audit.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_log_swallows_storage_errors() {
        let h = TestHarness::new();
        h.audit.fail_writes(true);

        let stored = AuditService::new(&h.ctx)
            .log(AuditRecord::new(audit_actions::LOGIN, "auth", AuditResult::Success))
            .await;

        assert!(stored.is_none());
        assert!(h.audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_each_call_appends_exactly_one_row() {
        let h = TestHarness::new();
        let audit = AuditService::new(&h.ctx);
        let m = meta();

        audit.log_auth(&m, audit_actions::LOGIN, Some(Snowflake::new(1)), true, None).await;
        audit.log_data_access(&m, Snowflake::new(1), "notifications", None).await;
        audit
            .log_data_modification(&m, Snowflake::new(1), DataOperation::Delete, "notifications", None)
            .await;
        audit.log_security_event(&m, "token_reuse", None, false, None).await;

        let entries = h.audit.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[2].action, audit_actions::DATA_DELETE);
        assert_eq!(entries[3].action, audit_actions::SECURITY_EVENT);
        assert_eq!(entries[3].metadata["event"], "token_reuse");
        assert_eq!(entries[3].result, AuditResult::Failure);
    }

    #[tokio::test]
    async fn test_query_reports_total_pages() {
        let h = TestHarness::new();
        let audit = AuditService::new(&h.ctx);
        for _ in 0..5 {
            audit
                .log(AuditRecord::new(audit_actions::DATA_ACCESS, "audit", AuditResult::Success))
                .await;
        }

        let page = audit
            .query(AuditLogFilter {
                page: 2,
                limit: 2,
                ..AuditLogFilter::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.page, 2);
    }

    #[tokio::test]
    async fn test_stats_keep_the_ten_busiest_actions() {
        let h = TestHarness::new();
        let audit = AuditService::new(&h.ctx);

        // ACTION_i is logged i + 1 times; the first of each batch fails
        for i in 0..12i64 {
            let resource = if i % 2 == 0 { "rooms" } else { "groups" };
            for n in 0..=i {
                let result = if n == 0 { AuditResult::Failure } else { AuditResult::Success };
                let mut record = AuditRecord::new(format!("ACTION_{i:02}"), resource, result);
                record.user_id = Some(Snowflake::new(n % 3 + 1));
                audit.log(record).await;
            }
        }
        audit
            .log(AuditRecord::new("ACTION_00", "rooms", AuditResult::Success))
            .await;

        let stats = audit.get_stats(None, None).await.unwrap();

        assert_eq!(stats.total, 79);
        assert_eq!(stats.failure, 12);
        assert_eq!(stats.success, 67);
        assert_eq!(stats.unique_users, 3);

        assert_eq!(stats.top_actions.len(), 10);
        assert_eq!(stats.top_actions[0].key, "ACTION_11");
        assert_eq!(stats.top_actions[0].count, 12);
        assert_eq!(stats.top_actions[9].key, "ACTION_02");
        assert!(stats
            .top_actions
            .windows(2)
            .all(|pair| pair[0].count >= pair[1].count));
        assert!(!stats.top_actions.iter().any(|a| a.key == "ACTION_00"));

        let resources: Vec<(&str, i64)> = stats
            .top_resources
            .iter()
            .map(|r| (r.key.as_str(), r.count))
            .collect();
        assert_eq!(resources, vec![("groups", 42), ("rooms", 37)]);
    }

    #[tokio::test]
    async fn test_cleanup_returns_zero_on_error() {
        let h = TestHarness::new();
        let audit = AuditService::new(&h.ctx);
        audit
            .log(AuditRecord::new(audit_actions::LOGIN, "auth", AuditResult::Success))
            .await;

        h.audit.fail_writes(true);
        assert_eq!(audit.cleanup(Utc::now() + Duration::days(1)).await, 0);

        h.audit.fail_writes(false);
        assert_eq!(audit.cleanup(Utc::now() + Duration::days(1)).await, 1);
    }
}
