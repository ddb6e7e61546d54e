//! Notification inbox and preference handlers

use axum::extract::State;
use community_core::NotificationPreferences;
use community_service::dto::{
    AffectedResponse, NotificationListQuery, NotificationListResponse, UpdatePreferencesRequest,
};
use community_service::services::DataOperation;
use community_service::{AuditService, NotificationService};
use serde_json::json;

use crate::extractors::{
    AuthUser, ClientMeta, NotificationIdPath, SnowflakePath, ValidatedJson, ValidatedQuery,
};
use crate::response::{ApiJson, ApiResult, NoContent};
use crate::state::AppState;

/// Default inbox page size
const DEFAULT_LIMIT: i64 = 20;

/// GET /users/@me/notification-preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<NotificationPreferences>> {
    let prefs = NotificationService::new(state.service_context())
        .get_preferences(auth.user_id)
        .await?;
    Ok(ApiJson(prefs))
}

/// PATCH /users/@me/notification-preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    ValidatedJson(request): ValidatedJson<UpdatePreferencesRequest>,
) -> ApiResult<ApiJson<NotificationPreferences>> {
    let ctx = state.service_context();
    let prefs = NotificationService::new(ctx)
        .update_preferences(auth.user_id, request)
        .await?;

    AuditService::new(ctx)
        .log_data_modification(
            &meta,
            auth.user_id,
            DataOperation::Update,
            "notification_preferences",
            Some(json!({ "preferences": prefs })),
        )
        .await;

    Ok(ApiJson(prefs))
}

/// Inbox page plus the unread count
///
/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<NotificationListQuery>,
) -> ApiResult<ApiJson<NotificationListResponse>> {
    let page = NotificationService::new(state.service_context())
        .list_for_user(
            auth.user_id,
            query.unread_only,
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(ApiJson(page))
}

/// PATCH /notifications/:notification_id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(path): SnowflakePath<NotificationIdPath>,
) -> ApiResult<NoContent> {
    NotificationService::new(state.service_context())
        .mark_read(path.notification_id()?, auth.user_id)
        .await?;
    Ok(NoContent)
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<AffectedResponse>> {
    let affected = NotificationService::new(state.service_context())
        .mark_all_read(auth.user_id)
        .await?;
    Ok(ApiJson(AffectedResponse { affected }))
}

/// DELETE /notifications/:notification_id
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
    SnowflakePath(path): SnowflakePath<NotificationIdPath>,
) -> ApiResult<NoContent> {
    let id = path.notification_id()?;
    let ctx = state.service_context();
    NotificationService::new(ctx).delete(id, auth.user_id).await?;

    AuditService::new(ctx)
        .log_data_modification(
            &meta,
            auth.user_id,
            DataOperation::Delete,
            "notifications",
            Some(json!({ "notificationId": id })),
        )
        .await;

    Ok(NoContent)
}

/// DELETE /notifications
pub async fn delete_all_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientMeta(meta): ClientMeta,
) -> ApiResult<ApiJson<AffectedResponse>> {
    let ctx = state.service_context();
    let affected = NotificationService::new(ctx).delete_all(auth.user_id).await?;

    AuditService::new(ctx)
        .log_data_modification(
            &meta,
            auth.user_id,
            DataOperation::Delete,
            "notifications",
            Some(json!({ "affected": affected })),
        )
        .await;

    Ok(ApiJson(AffectedResponse { affected }))
}
