//! Moderation handlers
//!
//! Flagging content, muting and unmuting users, and reading the moderation log.

use axum::{extract::State, http::StatusCode};
use community_core::{ModerationLog, ModerationScope, Snowflake, UserMute};
use community_service::dto::{
    FlagContentRequest, HistoryQuery, MuteStatusQuery, MuteStatusResponse, MuteUserRequest,
    ScopeQuery,
};
use community_service::services::{DataOperation, MuteOutcome};
use community_service::{AuditService, ModerationService};
use serde_json::json;

use super::{audit_denied, require_admin};
use crate::extractors::{
    AuthUser, ClientMeta, MuteIdPath, SnowflakePath, TargetIdPath, ValidatedJson, ValidatedQuery,
};
use crate::response::{ApiError, ApiJson, ApiResult, Created};
use crate::state::AppState;

const RESOURCE: &str = "moderation";

fn scope_of(room_id: Option<Snowflake>, group_id: Option<Snowflake>) -> ApiResult<ModerationScope> {
    ModerationScope::from_parts(room_id, group_id).map_err(ApiError::from)
}

/// Flag a post or message
///
/// POST /moderation/flag
pub async fn flag_content(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    ValidatedJson(request): ValidatedJson<FlagContentRequest>,
) -> ApiResult<Created<ApiJson<ModerationLog>>> {
    let ctx = state.service_context();
    let result = ModerationService::new(ctx)
        .flag_content(
            request.content_id,
            request.content_type,
            auth.user_id,
            request.reason,
        )
        .await;
    let log = audit_denied(&state, &meta, auth.user_id, RESOURCE, result).await?;

    AuditService::new(ctx)
        .log_data_modification(
            &meta,
            auth.user_id,
            DataOperation::Create,
            "moderation_log",
            Some(json!({
                "moderationAction": log.action.as_str(),
                "logId": log.id,
                "targetId": log.target_id,
            })),
        )
        .await;

    Ok(Created(ApiJson(log)))
}

/// Mute a user in a room or group, extending an active mute
///
/// POST /moderation/mutes
pub async fn mute_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    ValidatedJson(request): ValidatedJson<MuteUserRequest>,
) -> ApiResult<(StatusCode, ApiJson<MuteOutcome>)> {
    let ctx = state.service_context();
    let result = ModerationService::new(ctx)
        .mute_user(request.into_command(auth.user_id))
        .await;
    let outcome = audit_denied(&state, &meta, auth.user_id, RESOURCE, result).await?;

    let (operation, status) = if outcome.extended {
        (DataOperation::Update, StatusCode::OK)
    } else {
        (DataOperation::Create, StatusCode::CREATED)
    };
    AuditService::new(ctx)
        .log_data_modification(
            &meta,
            auth.user_id,
            operation,
            "user_mute",
            Some(json!({
                "muteId": outcome.mute.id,
                "userId": outcome.mute.user_id,
                "scope": outcome.mute.scope.to_string(),
                "expiresAt": outcome.mute.expires_at,
            })),
        )
        .await;

    Ok((status, ApiJson(outcome)))
}

/// Lift a mute
///
/// DELETE /moderation/mutes/:mute_id
pub async fn unmute_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    SnowflakePath(path): SnowflakePath<MuteIdPath>,
) -> ApiResult<ApiJson<UserMute>> {
    let mute_id = path.mute_id()?;
    let ctx = state.service_context();
    let result = ModerationService::new(ctx)
        .unmute_user(mute_id, auth.user_id)
        .await;
    let mute = audit_denied(&state, &meta, auth.user_id, RESOURCE, result).await?;

    AuditService::new(ctx)
        .log_data_modification(
            &meta,
            auth.user_id,
            DataOperation::Delete,
            "user_mute",
            Some(json!({
                "muteId": mute.id,
                "userId": mute.user_id,
                "scope": mute.scope.to_string(),
            })),
        )
        .await;

    Ok(ApiJson(mute))
}

/// Whether a user is muted in a scope right now
///
/// GET /moderation/mutes/status?userId=&roomId=|groupId=
pub async fn mute_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<MuteStatusQuery>,
) -> ApiResult<ApiJson<MuteStatusResponse>> {
    let scope = scope_of(query.room_id, query.group_id)?;
    let muted = ModerationService::new(state.service_context())
        .is_user_muted(query.user_id, scope)
        .await?;

    Ok(ApiJson(MuteStatusResponse {
        user_id: query.user_id,
        room_id: scope.room_id(),
        group_id: scope.group_id(),
        muted,
    }))
}

/// Active mutes in a scope, for its moderators
///
/// GET /moderation/mutes?roomId=|groupId=
pub async fn list_active_mutes(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    ValidatedQuery(query): ValidatedQuery<ScopeQuery>,
) -> ApiResult<ApiJson<Vec<UserMute>>> {
    let scope = scope_of(query.room_id, query.group_id)?;
    let result = ModerationService::new(state.service_context())
        .list_active_mutes(scope, auth.user_id)
        .await;
    let mutes = audit_denied(&state, &meta, auth.user_id, RESOURCE, result).await?;
    Ok(ApiJson(mutes))
}

/// Moderation history of a user or piece of content, for platform admins
///
/// GET /moderation/logs/:target_id
pub async fn moderation_history(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    SnowflakePath(path): SnowflakePath<TargetIdPath>,
    ValidatedQuery(query): ValidatedQuery<HistoryQuery>,
) -> ApiResult<ApiJson<Vec<ModerationLog>>> {
    let target_id = path.target_id()?;
    require_admin(&state, &meta, auth.user_id, "moderation_log").await?;

    let logs = ModerationService::new(state.service_context())
        .history_for_target(target_id, query.limit.unwrap_or(50))
        .await?;

    Ok(ApiJson(logs))
}
