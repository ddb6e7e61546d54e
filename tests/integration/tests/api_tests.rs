//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance (migrations are applied on startup)
//! - Environment variables: DATABASE_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use community_core::{MemberRole, UserRole};
use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Room with an owner, a moderator and a plain member
struct RoomSetup {
    room: community_core::Room,
    moderator: community_core::User,
    moderator_token: String,
    member: community_core::User,
    member_token: String,
}

async fn room_setup(server: &TestServer) -> RoomSetup {
    let owner = server.seed_user(UserRole::Member).await.unwrap();
    let room = server.seed_room(&owner).await.unwrap();

    let moderator = server.seed_user(UserRole::Member).await.unwrap();
    server
        .join(room.scope(), &moderator, MemberRole::Moderator)
        .await
        .unwrap();

    let member = server.seed_user(UserRole::Member).await.unwrap();
    server
        .join(room.scope(), &member, MemberRole::Member)
        .await
        .unwrap();

    RoomSetup {
        moderator_token: server.token_for(moderator.id).unwrap(),
        member_token: server.token_for(member.id).unwrap(),
        room,
        moderator,
        member,
    }
}

async fn inbox(server: &TestServer, token: &str) -> NotificationListResponse {
    let response = server.get_auth("/notifications", token).await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_raw("/health").await.expect("Request failed");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_raw("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Error Envelope Tests
// ============================================================================

#[tokio::test]
async fn test_missing_auth_is_enveloped() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/notifications").await.unwrap();
    let body = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();

    assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_malformed_path_id() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = server.seed_user(UserRole::Member).await.unwrap();
    let token = server.token_for(user.id).unwrap();

    let response = server
        .delete_auth("/moderation/mutes/not-a-number", &token)
        .await
        .unwrap();
    let body = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
}

// ============================================================================
// Flag Tests
// ============================================================================

#[tokio::test]
async fn test_flag_message_notifies_author() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;
    let message = server
        .seed_message(&setup.room, &setup.member)
        .await
        .unwrap();

    let request = FlagContentRequest {
        content_id: message.id.to_string(),
        content_type: "MESSAGE",
        reason: Some("off topic".to_string()),
    };
    let response = server
        .post_auth("/moderation/flag", &setup.moderator_token, &request)
        .await
        .unwrap();
    let log: ModerationLogResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(log.action, "CONTENT_FLAG");
    assert_eq!(log.target_id, message.id.to_string());
    assert_eq!(log.moderator_id, setup.moderator.id.to_string());
    assert_eq!(log.reason.as_deref(), Some("off topic"));
    assert_eq!(log.metadata["contentType"], "MESSAGE");

    let page = inbox(&server, &setup.member_token).await;
    assert_eq!(page.unread_count, 1);
    assert_eq!(page.notifications[0].kind, "WARNING");
    assert_eq!(page.notifications[0].title, "Content flagged");
}

#[tokio::test]
async fn test_flag_requires_moderator() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;
    let message = server
        .seed_message(&setup.room, &setup.moderator)
        .await
        .unwrap();

    let request = FlagContentRequest {
        content_id: message.id.to_string(),
        content_type: "MESSAGE",
        reason: None,
    };
    let response = server
        .post_auth("/moderation/flag", &setup.member_token, &request)
        .await
        .unwrap();
    let body = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_MODERATOR");
}

#[tokio::test]
async fn test_flag_respects_opt_out() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;

    let response = server
        .patch_auth(
            "/users/@me/notification-preferences",
            &setup.member_token,
            &json!({ "communityModeration": false }),
        )
        .await
        .unwrap();
    let prefs: PreferencesResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!prefs.community_moderation);
    assert!(prefs.community_comments);

    let message = server
        .seed_message(&setup.room, &setup.member)
        .await
        .unwrap();
    let request = FlagContentRequest {
        content_id: message.id.to_string(),
        content_type: "MESSAGE",
        reason: None,
    };
    let response = server
        .post_auth("/moderation/flag", &setup.moderator_token, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let page = inbox(&server, &setup.member_token).await;
    assert!(page.notifications.is_empty());
}

// ============================================================================
// Mute Tests
// ============================================================================

#[tokio::test]
async fn test_mute_extend_and_unmute() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;

    // First mute creates
    let request = MuteUserRequest::in_room(setup.member.id, setup.room.id, 30);
    let response = server
        .post_auth("/moderation/mutes", &setup.moderator_token, &request)
        .await
        .unwrap();
    let first: MuteOutcomeResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(!first.extended);
    assert_eq!(first.mute.user_id, setup.member.id.to_string());
    assert_eq!(first.mute.muted_by, setup.moderator.id.to_string());
    assert_eq!(first.mute.scope["kind"], "room");

    // Second mute extends the same row
    let request = MuteUserRequest::in_room(setup.member.id, setup.room.id, 60);
    let response = server
        .post_auth("/moderation/mutes", &setup.moderator_token, &request)
        .await
        .unwrap();
    let second: MuteOutcomeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(second.extended);
    assert_eq!(second.mute.id, first.mute.id);
    assert!(second.mute.expires_at > first.mute.expires_at);

    let status_path = format!(
        "/moderation/mutes/status?userId={}&roomId={}",
        setup.member.id, setup.room.id
    );
    let response = server
        .get_auth(&status_path, &setup.member_token)
        .await
        .unwrap();
    let status: MuteStatusResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(status.muted);

    let response = server
        .get_auth(
            &format!("/moderation/mutes?roomId={}", setup.room.id),
            &setup.moderator_token,
        )
        .await
        .unwrap();
    let active: Vec<MuteResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(active.len(), 1);

    // Lift it
    let response = server
        .delete_auth(
            &format!("/moderation/mutes/{}", first.mute.id),
            &setup.moderator_token,
        )
        .await
        .unwrap();
    let lifted: MuteResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(lifted.id, first.mute.id);

    let response = server
        .get_auth(&status_path, &setup.member_token)
        .await
        .unwrap();
    let status: MuteStatusResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!status.muted);

    // Two mute notices and one unmute notice
    let page = inbox(&server, &setup.member_token).await;
    let kinds: Vec<&str> = page.notifications.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(kinds.iter().filter(|k| **k == "WARNING").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "INFO").count(), 1);
}

#[tokio::test]
async fn test_mute_rejects_self_and_bad_duration() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;

    let request = MuteUserRequest::in_room(setup.moderator.id, setup.room.id, 30);
    let response = server
        .post_auth("/moderation/mutes", &setup.moderator_token, &request)
        .await
        .unwrap();
    let body = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "SELF_MODERATION");

    let request = MuteUserRequest::in_room(setup.member.id, setup.room.id, 0);
    let response = server
        .post_auth("/moderation/mutes", &setup.moderator_token, &request)
        .await
        .unwrap();
    let body = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_member_cannot_mute() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;

    let request = MuteUserRequest::in_room(setup.moderator.id, setup.room.id, 30);
    let response = server
        .post_auth("/moderation/mutes", &setup.member_token, &request)
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Moderation History Tests
// ============================================================================

#[tokio::test]
async fn test_moderation_history_is_admin_only() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;
    let admin = server.seed_user(UserRole::Admin).await.unwrap();
    let admin_token = server.token_for(admin.id).unwrap();

    let request = MuteUserRequest::in_room(setup.member.id, setup.room.id, 15);
    let response = server
        .post_auth("/moderation/mutes", &setup.moderator_token, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let path = format!("/moderation/logs/{}", setup.member.id);
    let response = server.get_auth(&path, &setup.moderator_token).await.unwrap();
    let body = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_ADMIN");

    let response = server.get_auth(&path, &admin_token).await.unwrap();
    let logs: Vec<ModerationLogResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "USER_MUTE");
    assert_eq!(logs[0].metadata["durationMinutes"], 15);
}

// ============================================================================
// Notification Inbox Tests
// ============================================================================

#[tokio::test]
async fn test_inbox_read_and_delete() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;

    for _ in 0..2 {
        let message = server
            .seed_message(&setup.room, &setup.member)
            .await
            .unwrap();
        let request = FlagContentRequest {
            content_id: message.id.to_string(),
            content_type: "MESSAGE",
            reason: None,
        };
        let response = server
            .post_auth("/moderation/flag", &setup.moderator_token, &request)
            .await
            .unwrap();
        assert_status(response, StatusCode::CREATED).await.unwrap();
    }

    let page = inbox(&server, &setup.member_token).await;
    assert_eq!(page.unread_count, 2);
    let first_id = page.notifications[0].id.clone();

    // Mark one read
    let response = server
        .patch_auth(
            &format!("/notifications/{first_id}/read"),
            &setup.member_token,
            &json!({}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    assert_eq!(inbox(&server, &setup.member_token).await.unread_count, 1);

    // Someone else's notification is invisible
    let response = server
        .delete_auth(
            &format!("/notifications/{first_id}"),
            &setup.moderator_token,
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .post_empty_auth("/notifications/read-all", &setup.member_token)
        .await
        .unwrap();
    let affected: AffectedResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(affected.affected, 1);

    let response = server
        .get_auth("/notifications?unreadOnly=true", &setup.member_token)
        .await
        .unwrap();
    let unread: NotificationListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(unread.notifications.is_empty());

    let response = server
        .delete_auth("/notifications", &setup.member_token)
        .await
        .unwrap();
    let affected: AffectedResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(affected.affected, 2);
}

// ============================================================================
// Audit and Alert Admin Tests
// ============================================================================

#[tokio::test]
async fn test_audit_logs_record_denials() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let setup = room_setup(&server).await;
    let admin = server.seed_user(UserRole::Admin).await.unwrap();
    let admin_token = server.token_for(admin.id).unwrap();

    // Denied for a plain member, and that denial is itself audited
    let response = server
        .get_auth("/audit/logs", &setup.member_token)
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let path = format!(
        "/audit/logs?userId={}&action=ACCESS_DENIED",
        setup.member.id
    );
    let response = server.get_auth(&path, &admin_token).await.unwrap();
    let page: AuditPageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.entries[0]["result"], "failure");

    let response = server
        .get_auth("/audit/logs?limit=500", &admin_token)
        .await
        .unwrap();
    let body = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_alert_config_admin_only() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let member = server.seed_user(UserRole::Member).await.unwrap();
    let admin = server.seed_user(UserRole::Admin).await.unwrap();

    let response = server
        .get_auth("/admin/alerts", &server.token_for(member.id).unwrap())
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let admin_token = server.token_for(admin.id).unwrap();
    let response = server.get_auth("/admin/alerts", &admin_token).await.unwrap();
    let config: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(config["channels"].is_array());

    let response = server
        .patch_auth(
            "/admin/alerts",
            &admin_token,
            &json!({ "emailRecipients": ["not-an-email"] }),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
}
