//! Runtime alert configuration (platform admins only)

use axum::extract::State;
use community_service::dto::{AlertConfigResponse, UpdateAlertConfigRequest};
use community_service::AuditService;
use serde_json::json;

use super::require_admin;
use crate::extractors::{AuthUser, ClientMeta, ValidatedJson};
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

const RESOURCE: &str = "alert_config";

/// GET /admin/alerts
pub async fn get_config(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
) -> ApiResult<ApiJson<AlertConfigResponse>> {
    require_admin(&state, &meta, auth.user_id, RESOURCE).await?;

    let alerts = state.alerts();
    Ok(ApiJson(AlertConfigResponse::new(
        alerts.config(),
        alerts.environment(),
    )))
}

/// PATCH /admin/alerts
pub async fn update_config(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    ValidatedJson(request): ValidatedJson<UpdateAlertConfigRequest>,
) -> ApiResult<ApiJson<AlertConfigResponse>> {
    require_admin(&state, &meta, auth.user_id, RESOURCE).await?;

    let alerts = state.alerts();
    let config = alerts.update_config(request.into());

    AuditService::new(state.service_context())
        .log_security_event(
            &meta,
            "alert_config_updated",
            Some(auth.user_id),
            true,
            Some(json!({
                "enabled": config.enabled,
                "channels": config.channels,
                "minSeverity": config.min_severity,
            })),
        )
        .await;

    Ok(ApiJson(AlertConfigResponse::new(config, alerts.environment())))
}
