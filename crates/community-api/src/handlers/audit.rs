//! Audit log handlers (platform admins only)

use axum::extract::State;
use chrono::Utc;
use community_common::AuditConfig;
use community_core::{AuditLogFilter, AuditStats};
use community_service::dto::{AuditCleanupRequest, AuditLogQuery, AuditStatsQuery, CleanupResponse};
use community_service::services::{AuditPage, DataOperation};
use community_service::AuditService;
use serde_json::json;

use super::require_admin;
use crate::extractors::{AuthUser, ClientMeta, OptionalValidatedJson, ValidatedQuery};
use crate::response::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

const RESOURCE: &str = "audit_log";

/// GET /audit/logs
pub async fn query_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    ValidatedQuery(query): ValidatedQuery<AuditLogQuery>,
) -> ApiResult<ApiJson<AuditPage>> {
    require_admin(&state, &meta, auth.user_id, RESOURCE).await?;

    let audit = AuditService::new(state.service_context());
    let page = audit.query(AuditLogFilter::from(query)).await?;

    audit
        .log_data_access(
            &meta,
            auth.user_id,
            RESOURCE,
            Some(json!({ "page": page.page, "returned": page.entries.len() })),
        )
        .await;

    Ok(ApiJson(page))
}

/// GET /audit/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    ValidatedQuery(query): ValidatedQuery<AuditStatsQuery>,
) -> ApiResult<ApiJson<AuditStats>> {
    require_admin(&state, &meta, auth.user_id, RESOURCE).await?;

    let stats = AuditService::new(state.service_context())
        .get_stats(query.start_date, query.end_date)
        .await?;
    Ok(ApiJson(stats))
}

/// Delete entries older than the requested or configured retention
///
/// POST /audit/cleanup
pub async fn cleanup(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    OptionalValidatedJson(request): OptionalValidatedJson<AuditCleanupRequest>,
) -> ApiResult<ApiJson<CleanupResponse>> {
    require_admin(&state, &meta, auth.user_id, RESOURCE).await?;

    let days = request
        .and_then(|r| r.older_than_days)
        .unwrap_or(state.config().audit.retention_days);
    let cutoff = AuditConfig::retention_cutoff(days, Utc::now())
        .ok_or_else(|| ApiError::InvalidBody(format!("Retention of {days} days is out of range")))?;

    let audit = AuditService::new(state.service_context());
    let removed = audit.cleanup(cutoff).await;

    audit
        .log_data_modification(
            &meta,
            auth.user_id,
            DataOperation::Delete,
            RESOURCE,
            Some(json!({ "cutoff": cutoff, "removed": removed })),
        )
        .await;

    Ok(ApiJson(CleanupResponse { removed, cutoff }))
}
