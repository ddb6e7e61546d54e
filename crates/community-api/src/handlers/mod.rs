//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod alerts;
pub mod audit;
pub mod health;
pub mod moderation;
pub mod notifications;

use community_core::Snowflake;
use community_service::{AuditService, ModerationService, RequestMeta, ServiceResult};

use crate::response::ApiResult;
use crate::state::AppState;

/// Pass a service result through, recording a denied request in the audit log
pub(crate) async fn audit_denied<T>(
    state: &AppState,
    meta: &RequestMeta,
    user_id: Snowflake,
    resource: &str,
    result: ServiceResult<T>,
) -> ApiResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            if e.is_authorization() {
                AuditService::new(state.service_context())
                    .log_authorization_failure(meta, Some(user_id), resource, &e.to_string())
                    .await;
            }
            Err(e.into())
        }
    }
}

/// Admin gate shared by the audit and alert endpoints
pub(crate) async fn require_admin(
    state: &AppState,
    meta: &RequestMeta,
    user_id: Snowflake,
    resource: &str,
) -> ApiResult<()> {
    let result = ModerationService::new(state.service_context())
        .ensure_admin(user_id)
        .await;
    audit_denied(state, meta, user_id, resource, result).await
}
