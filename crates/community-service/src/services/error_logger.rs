//! Error logger
//!
//! Classifies runtime errors by severity and writes them to the log sink.
//! Critical entries are additionally mirrored into the audit trail and
//! handed to the alert dispatcher. Neither side effect can fail the caller.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::time::Duration;

use community_core::{audit_actions, AuditResult, Severity, Snowflake};
use serde_json::{json, Value as JsonValue};
use tracing::{error, info, warn};

use crate::alerting::ErrorLogEntry;

use super::audit::{AuditRecord, AuditService};
use super::context::ServiceContext;
use super::request_meta::RequestMeta;

/// Optional attributes of a logged error
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub severity: Severity,
    pub context: Option<JsonValue>,
    pub request: Option<RequestMeta>,
    pub user_id: Option<Snowflake>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::new(Severity::Error)
    }
}

impl LogOptions {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            context: None,
            request: None,
            user_id: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: JsonValue) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: RequestMeta) -> Self {
        self.request = Some(request);
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: Snowflake) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Same options at another severity
    #[must_use]
    pub fn at(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Error message followed by its source chain
fn describe(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}

/// Error logger
pub struct ErrorLogger<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ErrorLogger<'a> {
    /// Create a new ErrorLogger
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Log one error occurrence and return the entry that was built
    pub async fn log(
        &self,
        code: &str,
        message: &str,
        err: Option<&(dyn StdError + Send + Sync + '_)>,
        options: LogOptions,
    ) -> ErrorLogEntry {
        let mut entry = ErrorLogEntry::new(options.severity, code, message);
        entry.error = err.map(|e| describe(e));
        entry.context = options.context;
        entry.user_id = options.user_id;
        if let Some(request) = options.request {
            entry.request_id = request.request_id;
            entry.ip_address = Some(request.ip_address);
            entry.user_agent = Some(request.user_agent);
            entry.endpoint = request.endpoint;
            entry.method = request.method;
        }

        emit(&entry);

        if entry.severity == Severity::Critical {
            self.mirror_to_audit(&entry).await;
            self.ctx.alerts().send_alert(&entry).await;
        }

        entry
    }

    async fn mirror_to_audit(&self, entry: &ErrorLogEntry) {
        let mut record = AuditRecord::new(
            audit_actions::CRITICAL_ERROR,
            entry.endpoint.as_deref().unwrap_or("system"),
            AuditResult::Failure,
        );
        record.user_id = entry.user_id;
        if let Some(ip) = &entry.ip_address {
            record.ip_address.clone_from(ip);
        }
        if let Some(agent) = &entry.user_agent {
            record.user_agent.clone_from(agent);
        }
        record.metadata = json!({
            "code": entry.code,
            "message": entry.message,
            "severity": entry.severity,
            "requestId": entry.request_id,
            "method": entry.method,
            "error": entry.error,
            "context": entry.context,
        });
        AuditService::new(self.ctx).log(record).await;
    }

    // === Severity wrappers ===

    pub async fn info(&self, code: &str, message: &str, options: LogOptions) -> ErrorLogEntry {
        self.log(code, message, None, options.at(Severity::Info)).await
    }

    pub async fn warning(
        &self,
        code: &str,
        message: &str,
        err: Option<&(dyn StdError + Send + Sync + '_)>,
        options: LogOptions,
    ) -> ErrorLogEntry {
        self.log(code, message, err, options.at(Severity::Warning)).await
    }

    pub async fn error(
        &self,
        code: &str,
        message: &str,
        err: Option<&(dyn StdError + Send + Sync + '_)>,
        options: LogOptions,
    ) -> ErrorLogEntry {
        self.log(code, message, err, options.at(Severity::Error)).await
    }

    pub async fn critical(
        &self,
        code: &str,
        message: &str,
        err: Option<&(dyn StdError + Send + Sync + '_)>,
        options: LogOptions,
    ) -> ErrorLogEntry {
        self.log(code, message, err, options.at(Severity::Critical)).await
    }

    // === Domain helpers ===

    pub async fn database_connection_error(
        &self,
        err: &(dyn StdError + Send + Sync + '_),
        request: Option<RequestMeta>,
    ) -> ErrorLogEntry {
        self.critical(
            "DATABASE_CONNECTION_ERROR",
            "Database connection failed",
            Some(err),
            request_options(request),
        )
        .await
    }

    pub async fn database_query_error(
        &self,
        operation: &str,
        err: &(dyn StdError + Send + Sync + '_),
        request: Option<RequestMeta>,
    ) -> ErrorLogEntry {
        self.error(
            "DATABASE_QUERY_ERROR",
            "Database query failed",
            Some(err),
            request_options(request).with_context(json!({ "operation": operation })),
        )
        .await
    }

    pub async fn authentication_error(&self, reason: &str, request: Option<RequestMeta>) -> ErrorLogEntry {
        self.warning(
            "AUTHENTICATION_ERROR",
            &format!("Authentication failed: {reason}"),
            None,
            request_options(request),
        )
        .await
    }

    pub async fn authorization_error(
        &self,
        user_id: Snowflake,
        resource: &str,
        request: Option<RequestMeta>,
    ) -> ErrorLogEntry {
        self.warning(
            "AUTHORIZATION_ERROR",
            &format!("Access denied to {resource}"),
            None,
            request_options(request)
                .with_user(user_id)
                .with_context(json!({ "resource": resource })),
        )
        .await
    }

    pub async fn validation_error(
        &self,
        field: Option<&str>,
        message: &str,
        request: Option<RequestMeta>,
    ) -> ErrorLogEntry {
        let mut options = request_options(request);
        if let Some(field) = field {
            options = options.with_context(json!({ "field": field }));
        }
        self.info("VALIDATION_ERROR", message, options).await
    }

    pub async fn rate_limit_exceeded(&self, identifier: &str, request: Option<RequestMeta>) -> ErrorLogEntry {
        self.warning(
            "RATE_LIMIT_EXCEEDED",
            "Rate limit exceeded",
            None,
            request_options(request).with_context(json!({ "identifier": identifier })),
        )
        .await
    }

    pub async fn external_service_error(
        &self,
        service: &str,
        err: &(dyn StdError + Send + Sync + '_),
        request: Option<RequestMeta>,
    ) -> ErrorLogEntry {
        self.error(
            "EXTERNAL_SERVICE_ERROR",
            &format!("External service {service} failed"),
            Some(err),
            request_options(request).with_context(json!({ "service": service })),
        )
        .await
    }

    pub async fn file_upload_error(
        &self,
        filename: &str,
        err: &(dyn StdError + Send + Sync + '_),
        request: Option<RequestMeta>,
    ) -> ErrorLogEntry {
        self.error(
            "FILE_UPLOAD_ERROR",
            "File upload failed",
            Some(err),
            request_options(request).with_context(json!({ "filename": filename })),
        )
        .await
    }

    pub async fn cache_error(&self, operation: &str, err: &(dyn StdError + Send + Sync + '_)) -> ErrorLogEntry {
        self.warning(
            "CACHE_ERROR",
            "Cache operation failed",
            Some(err),
            LogOptions::default().with_context(json!({ "operation": operation })),
        )
        .await
    }

    pub async fn slow_query(&self, query: &str, elapsed: Duration) -> ErrorLogEntry {
        self.warning(
            "SLOW_QUERY",
            &format!("Slow query took {}ms", elapsed.as_millis()),
            None,
            LogOptions::default().with_context(json!({
                "query": query,
                "durationMs": elapsed.as_millis() as u64,
            })),
        )
        .await
    }

    pub async fn slow_request(&self, request: RequestMeta, elapsed: Duration) -> ErrorLogEntry {
        self.warning(
            "SLOW_REQUEST",
            &format!("Slow request took {}ms", elapsed.as_millis()),
            None,
            LogOptions::default()
                .with_request(request)
                .with_context(json!({ "durationMs": elapsed.as_millis() as u64 })),
        )
        .await
    }
}

fn request_options(request: Option<RequestMeta>) -> LogOptions {
    let options = LogOptions::default();
    match request {
        Some(request) => options.with_request(request),
        None => options,
    }
}

/// Write the entry to the log sink at the level matching its severity
fn emit(entry: &ErrorLogEntry) {
    let request_id = entry.request_id.as_deref().unwrap_or("-");
    let endpoint = entry.endpoint.as_deref().unwrap_or("-");
    let detail = entry.error.as_deref().unwrap_or("");
    match entry.severity {
        Severity::Info => info!(
            code = %entry.code,
            request_id,
            endpoint,
            "{}",
            entry.message
        ),
        Severity::Warning => warn!(
            code = %entry.code,
            request_id,
            endpoint,
            error = detail,
            "{}",
            entry.message
        ),
        Severity::Error | Severity::Critical => error!(
            code = %entry.code,
            severity = %entry.severity,
            request_id,
            endpoint,
            error = detail,
            "{}",
            entry.message
        ),
    }
}
