//! Notification service
//!
//! Preference-gated notification templates and the per-user inbox.
//! A category helper checks the gate before anything is written, so a
//! disabled preference never produces a row.

use chrono::{DateTime, Utc};
use community_core::{
    ContentRef, ContentType, ModerationScope, Notification, NotificationCategory,
    NotificationPreferences, NotificationType, Snowflake,
};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, instrument, warn};

use crate::dto::{NotificationListResponse, UpdatePreferencesRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Largest inbox page
pub const MAX_PAGE_SIZE: i64 = 100;

/// Fields of a notification before it is given an id
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Snowflake,
    pub kind: NotificationType,
    pub title: String,
    pub description: String,
    pub action_url: Option<String>,
    pub metadata: Option<JsonValue>,
}

/// Where a piece of content lives in the web client
fn content_url(content: &ContentRef) -> String {
    match (content.content_type, content.scope) {
        (ContentType::Post, _) => format!("/community/posts/{}", content.id),
        (ContentType::Message, Some(scope)) => scope_url(scope),
        (ContentType::Message, None) => "/community".to_string(),
    }
}

fn scope_url(scope: ModerationScope) -> String {
    match scope {
        ModerationScope::Room(id) => format!("/community/rooms/{id}"),
        ModerationScope::Group(id) => format!("/community/groups/{id}"),
    }
}

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // === Preference gate ===

    /// Whether a notification of this category may be created for the user.
    ///
    /// A missing user or a failed lookup answers with the configured
    /// fail-open policy.
    #[instrument(skip(self))]
    pub async fn should_notify(&self, user_id: Snowflake, category: NotificationCategory) -> bool {
        let fallback = self.ctx.settings().preference_fail_open;
        match self.ctx.user_repo().find_by_id(user_id).await {
            Ok(Some(user)) => user.wants(category),
            Ok(None) => {
                debug!(%user_id, fallback, "Preference check for unknown user");
                fallback
            }
            Err(e) => {
                warn!(%user_id, error = %e, fallback, "Preference lookup failed");
                fallback
            }
        }
    }

    /// Gate, then create. `Ok(None)` when the user opted out.
    async fn create_gated(
        &self,
        category: NotificationCategory,
        notification: NewNotification,
    ) -> ServiceResult<Option<Notification>> {
        if !self.should_notify(notification.user_id, category).await {
            debug!(user_id = %notification.user_id, %category, "Notification suppressed by preference");
            return Ok(None);
        }
        self.create_notification(notification).await.map(Some)
    }

    /// Create a notification without consulting preferences (system kinds)
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id, kind = %notification.kind))]
    pub async fn create_notification(&self, notification: NewNotification) -> ServiceResult<Notification> {
        if notification.title.trim().is_empty() {
            return Err(ServiceError::validation("Notification title is required"));
        }

        let mut created = Notification::new(
            self.ctx.generate_id(),
            notification.user_id,
            notification.kind,
            notification.title,
            notification.description,
        );
        if let Some(url) = notification.action_url {
            created = created.with_action_url(url);
        }
        if let Some(metadata) = notification.metadata {
            created = created.with_metadata(metadata);
        }

        self.ctx.notification_repo().create(&created).await?;
        debug!(notification_id = %created.id, "Notification created");
        Ok(created)
    }

    // === Social templates ===

    pub async fn notify_comment(
        &self,
        recipient_id: Snowflake,
        commenter_name: &str,
        post_id: Snowflake,
        post_title: &str,
    ) -> ServiceResult<Option<Notification>> {
        self.create_gated(
            NotificationCategory::CommunityComments,
            NewNotification {
                user_id: recipient_id,
                kind: NotificationType::Comment,
                title: "New comment".to_string(),
                description: format!("{commenter_name} commented on your post \"{post_title}\""),
                action_url: Some(format!("/community/posts/{post_id}")),
                metadata: Some(json!({ "postId": post_id, "commenter": commenter_name })),
            },
        )
        .await
    }

    pub async fn notify_reaction(
        &self,
        recipient_id: Snowflake,
        reactor_name: &str,
        reaction: &str,
        post_id: Snowflake,
        post_title: &str,
    ) -> ServiceResult<Option<Notification>> {
        self.create_gated(
            NotificationCategory::CommunityReactions,
            NewNotification {
                user_id: recipient_id,
                kind: NotificationType::Reaction,
                title: "New reaction".to_string(),
                description: format!("{reactor_name} reacted {reaction} to \"{post_title}\""),
                action_url: Some(format!("/community/posts/{post_id}")),
                metadata: Some(json!({ "postId": post_id, "reaction": reaction })),
            },
        )
        .await
    }

    pub async fn notify_mention(
        &self,
        recipient_id: Snowflake,
        mentioner_name: &str,
        scope: ModerationScope,
        excerpt: &str,
    ) -> ServiceResult<Option<Notification>> {
        let mut metadata = scope.to_metadata();
        metadata["mentionedBy"] = json!(mentioner_name);
        self.create_gated(
            NotificationCategory::CommunityMentions,
            NewNotification {
                user_id: recipient_id,
                kind: NotificationType::Mention,
                title: "You were mentioned".to_string(),
                description: format!("{mentioner_name} mentioned you: \"{excerpt}\""),
                action_url: Some(scope_url(scope)),
                metadata: Some(metadata),
            },
        )
        .await
    }

    pub async fn notify_group_update(
        &self,
        recipient_id: Snowflake,
        group_id: Snowflake,
        group_name: &str,
        update: &str,
    ) -> ServiceResult<Option<Notification>> {
        self.create_gated(
            NotificationCategory::CommunityGroupUpdates,
            NewNotification {
                user_id: recipient_id,
                kind: NotificationType::GroupUpdate,
                title: format!("Update in {group_name}"),
                description: update.to_string(),
                action_url: Some(scope_url(ModerationScope::Group(group_id))),
                metadata: Some(json!({ "groupId": group_id })),
            },
        )
        .await
    }

    // === Moderation templates ===

    /// Generic moderation notice
    pub async fn notify_moderation(
        &self,
        recipient_id: Snowflake,
        title: &str,
        description: &str,
        metadata: Option<JsonValue>,
    ) -> ServiceResult<Option<Notification>> {
        self.create_gated(
            NotificationCategory::CommunityModeration,
            NewNotification {
                user_id: recipient_id,
                kind: NotificationType::Moderation,
                title: title.to_string(),
                description: description.to_string(),
                action_url: None,
                metadata,
            },
        )
        .await
    }

    pub async fn notify_content_flagged(
        &self,
        content: &ContentRef,
        reason: Option<&str>,
    ) -> ServiceResult<Option<Notification>> {
        let noun = match content.content_type {
            ContentType::Post => "post",
            ContentType::Message => "message",
        };
        let mut description = format!("Your {noun} \"{}\" was flagged by a moderator", content.label);
        if let Some(reason) = reason {
            description.push_str(&format!(". Reason: {reason}"));
        }

        self.create_gated(
            NotificationCategory::CommunityModeration,
            NewNotification {
                user_id: content.author_id,
                kind: NotificationType::Warning,
                title: "Content flagged".to_string(),
                description,
                action_url: Some(content_url(content)),
                metadata: Some(json!({
                    "contentId": content.id,
                    "contentType": content.content_type,
                    "reason": reason,
                })),
            },
        )
        .await
    }

    pub async fn notify_user_muted(
        &self,
        user_id: Snowflake,
        scope: ModerationScope,
        scope_name: &str,
        expires_at: DateTime<Utc>,
        reason: Option<&str>,
    ) -> ServiceResult<Option<Notification>> {
        let mut description = format!(
            "You have been muted in {scope_name} until {}",
            expires_at.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(reason) = reason {
            description.push_str(&format!(". Reason: {reason}"));
        }
        let mut metadata = scope.to_metadata();
        metadata["expiresAt"] = json!(expires_at);

        self.create_gated(
            NotificationCategory::CommunityModeration,
            NewNotification {
                user_id,
                kind: NotificationType::Warning,
                title: "You have been muted".to_string(),
                description,
                action_url: Some(scope_url(scope)),
                metadata: Some(metadata),
            },
        )
        .await
    }

    pub async fn notify_user_unmuted(
        &self,
        user_id: Snowflake,
        scope: ModerationScope,
    ) -> ServiceResult<Option<Notification>> {
        self.create_gated(
            NotificationCategory::CommunityModeration,
            NewNotification {
                user_id,
                kind: NotificationType::Info,
                title: "Mute lifted".to_string(),
                description: "A moderator lifted your mute. You can post again.".to_string(),
                action_url: Some(scope_url(scope)),
                metadata: Some(scope.to_metadata()),
            },
        )
        .await
    }

    // === Inbox ===

    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: Snowflake,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<NotificationListResponse> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = offset.max(0);
        let repo = self.ctx.notification_repo();

        let notifications = repo.find_by_user(user_id, unread_only, limit, offset).await?;
        let unread_count = repo.count_unread(user_id).await?;

        Ok(NotificationListResponse {
            notifications,
            unread_count,
            limit,
            offset,
        })
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        if self.ctx.notification_repo().mark_read(id, user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Notification", id.to_string()))
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: Snowflake) -> ServiceResult<u64> {
        Ok(self.ctx.notification_repo().mark_all_read(user_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        if self.ctx.notification_repo().delete(id, user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Notification", id.to_string()))
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_all(&self, user_id: Snowflake) -> ServiceResult<u64> {
        let removed = self.ctx.notification_repo().delete_all(user_id).await?;
        info!(%user_id, removed, "Notifications cleared");
        Ok(removed)
    }

    // === Preferences ===

    pub async fn get_preferences(&self, user_id: Snowflake) -> ServiceResult<NotificationPreferences> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .map(|user| user.preferences)
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    #[instrument(skip(self, request))]
    pub async fn update_preferences(
        &self,
        user_id: Snowflake,
        request: UpdatePreferencesRequest,
    ) -> ServiceResult<NotificationPreferences> {
        let mut preferences = self.get_preferences(user_id).await?;
        request.apply(&mut preferences);
        self.ctx
            .user_repo()
            .update_preferences(user_id, &preferences)
            .await?;
        Ok(preferences)
    }
}
