//! Moderation service
//!
//! Decides who may flag content or mute users in a room or group, and
//! records every decision in the moderation log. Each operation runs
//! permission check, mutation, log write and then the user notification,
//! strictly in that order. The notification is best-effort.

use chrono::{DateTime, Duration, Utc};
use community_core::{
    ContentRef, ContentType, DomainError, ModerationAction, ModerationLog, ModerationScope,
    Snowflake, UserMute,
};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use super::best_effort;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notification::NotificationService;

/// Longest mute a moderator can hand out (one year)
pub const MAX_MUTE_MINUTES: i64 = 525_600;

/// Largest moderation history page
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Input of [`ModerationService::mute_user`]
#[derive(Debug, Clone)]
pub struct MuteCommand {
    pub user_id: Snowflake,
    pub room_id: Option<Snowflake>,
    pub group_id: Option<Snowflake>,
    pub moderator_id: Snowflake,
    pub duration_minutes: i64,
    pub reason: Option<String>,
}

/// Result of a mute: the stored row and whether an active mute was extended
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteOutcome {
    pub mute: UserMute,
    pub extended: bool,
}

/// Moderation service
pub struct ModerationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ModerationService<'a> {
    /// Create a new ModerationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fail unless the user holds a moderator or admin role in the scope
    pub async fn ensure_moderator(
        &self,
        user_id: Snowflake,
        scope: ModerationScope,
    ) -> ServiceResult<()> {
        let membership = self.ctx.membership_repo().find(scope, user_id).await?;
        match membership {
            Some(m) if m.is_moderator() => Ok(()),
            _ => Err(DomainError::NotModerator(scope).into()),
        }
    }

    /// Fail unless the user is a platform admin
    pub async fn ensure_admin(&self, user_id: Snowflake) -> ServiceResult<()> {
        match self.ctx.user_repo().find_by_id(user_id).await? {
            Some(user) if user.is_admin() => Ok(()),
            Some(_) => Err(DomainError::NotAdmin.into()),
            None => Err(DomainError::UserNotFound(user_id).into()),
        }
    }

    async fn resolve_content(
        &self,
        content_id: Snowflake,
        content_type: ContentType,
    ) -> ServiceResult<ContentRef> {
        match content_type {
            ContentType::Post => self
                .ctx
                .post_repo()
                .find_by_id(content_id)
                .await?
                .map(ContentRef::from)
                .ok_or_else(|| DomainError::PostNotFound(content_id).into()),
            ContentType::Message => self
                .ctx
                .message_repo()
                .find_by_id(content_id)
                .await?
                .map(ContentRef::from)
                .ok_or_else(|| DomainError::MessageNotFound(content_id).into()),
        }
    }

    /// Display name of a room or group, failing if it does not exist
    async fn scope_name(&self, scope: ModerationScope) -> ServiceResult<String> {
        match scope {
            ModerationScope::Room(id) => self
                .ctx
                .room_repo()
                .find_by_id(id)
                .await?
                .map(|room| room.name)
                .ok_or_else(|| DomainError::RoomNotFound(id).into()),
            ModerationScope::Group(id) => self
                .ctx
                .group_repo()
                .find_by_id(id)
                .await?
                .map(|group| group.name)
                .ok_or_else(|| DomainError::GroupNotFound(id).into()),
        }
    }

    /// Flag a post or message and notify its author
    #[instrument(skip(self, reason))]
    pub async fn flag_content(
        &self,
        content_id: Snowflake,
        content_type: ContentType,
        moderator_id: Snowflake,
        reason: Option<String>,
    ) -> ServiceResult<ModerationLog> {
        if self.ctx.user_repo().find_by_id(moderator_id).await?.is_none() {
            return Err(ServiceError::validation("Moderator not found"));
        }

        let content = self.resolve_content(content_id, content_type).await?;
        let scope = content.scope.ok_or_else(|| {
            ServiceError::validation("Content does not belong to a room or group")
        })?;

        self.ensure_moderator(moderator_id, scope).await?;

        let mut metadata = scope.to_metadata();
        metadata["contentType"] = json!(content_type);
        metadata["authorId"] = json!(content.author_id);

        let log = self
            .log_moderation_action(
                ModerationAction::ContentFlag,
                moderator_id,
                content.id,
                reason.clone(),
                Some(metadata),
            )
            .await?;

        info!(%content_id, %moderator_id, %scope, "Content flagged");

        best_effort(
            "content flagged notification",
            NotificationService::new(self.ctx).notify_content_flagged(&content, reason.as_deref()),
        )
        .await;

        Ok(log)
    }

    /// Mute a member of a room or group, extending an active mute if one exists
    #[instrument(skip(self, command), fields(user_id = %command.user_id, moderator_id = %command.moderator_id))]
    pub async fn mute_user(&self, command: MuteCommand) -> ServiceResult<MuteOutcome> {
        let MuteCommand {
            user_id,
            room_id,
            group_id,
            moderator_id,
            duration_minutes,
            reason,
        } = command;

        // Input checks, no store access
        if user_id == moderator_id {
            return Err(DomainError::SelfModeration.into());
        }
        let scope = ModerationScope::from_parts(room_id, group_id)?;
        if duration_minutes <= 0 {
            return Err(ServiceError::validation("Duration must be positive"));
        }
        if duration_minutes > MAX_MUTE_MINUTES {
            return Err(ServiceError::validation(format!(
                "Duration must be at most {MAX_MUTE_MINUTES} minutes"
            )));
        }

        if self.ctx.user_repo().find_by_id(moderator_id).await?.is_none() {
            return Err(ServiceError::validation("Moderator not found"));
        }
        if self.ctx.user_repo().find_by_id(user_id).await?.is_none() {
            return Err(DomainError::UserNotFound(user_id).into());
        }
        let scope_name = self.scope_name(scope).await?;

        self.ensure_moderator(moderator_id, scope).await?;

        if self.ctx.membership_repo().find(scope, user_id).await?.is_none() {
            return Err(DomainError::NotAMember { user_id, scope }.into());
        }

        let now = Utc::now();
        let expires_at = Duration::try_minutes(duration_minutes)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| ServiceError::validation("Duration out of range"))?;

        // Read-then-write: concurrent mutes of the same user and scope race, last write wins
        let existing = self.ctx.mute_repo().find_active(user_id, scope, now).await?;
        let (mute, extended) = match existing {
            Some(mut mute) => {
                mute.extend(expires_at, moderator_id, reason.clone());
                self.ctx.mute_repo().extend(&mute).await?;
                (mute, true)
            }
            None => {
                let mute = UserMute {
                    id: self.ctx.generate_id(),
                    user_id,
                    scope,
                    muted_by: moderator_id,
                    reason: reason.clone(),
                    expires_at,
                    created_at: now,
                };
                self.ctx.mute_repo().create(&mute).await?;
                (mute, false)
            }
        };

        let mut metadata = scope.to_metadata();
        metadata["muteId"] = json!(mute.id);
        metadata["durationMinutes"] = json!(duration_minutes);
        metadata["expiresAt"] = json!(expires_at);
        metadata["extended"] = json!(extended);

        self.log_moderation_action(
            ModerationAction::UserMute,
            moderator_id,
            user_id,
            reason.clone(),
            Some(metadata),
        )
        .await?;

        info!(%scope, %expires_at, extended, "User muted");

        best_effort(
            "user muted notification",
            NotificationService::new(self.ctx).notify_user_muted(
                user_id,
                scope,
                &scope_name,
                expires_at,
                reason.as_deref(),
            ),
        )
        .await;

        Ok(MuteOutcome { mute, extended })
    }

    /// Lift a mute. Expired rows count as already lifted.
    #[instrument(skip(self))]
    pub async fn unmute_user(
        &self,
        mute_id: Snowflake,
        moderator_id: Snowflake,
    ) -> ServiceResult<UserMute> {
        let mute = self
            .ctx
            .mute_repo()
            .find_by_id(mute_id)
            .await?
            .filter(|mute| mute.is_active_at(Utc::now()))
            .ok_or(DomainError::MuteNotFound(mute_id))?;

        self.ensure_moderator(moderator_id, mute.scope).await?;

        if !self.ctx.mute_repo().delete(mute_id).await? {
            // Removed by a concurrent unmute
            return Err(DomainError::MuteNotFound(mute_id).into());
        }

        let mut metadata = mute.scope.to_metadata();
        metadata["action"] = json!("unmute");
        metadata["muteId"] = json!(mute.id);
        metadata["expiresAt"] = json!(mute.expires_at);

        self.log_moderation_action(
            ModerationAction::UserUnmute,
            moderator_id,
            mute.user_id,
            None,
            Some(metadata),
        )
        .await?;

        info!(user_id = %mute.user_id, scope = %mute.scope, "User unmuted");

        best_effort(
            "user unmuted notification",
            NotificationService::new(self.ctx).notify_user_unmuted(mute.user_id, mute.scope),
        )
        .await;

        Ok(mute)
    }

    /// Whether the user has an unexpired mute in the scope right now
    pub async fn is_user_muted(&self, user_id: Snowflake, scope: ModerationScope) -> ServiceResult<bool> {
        self.is_user_muted_at(user_id, scope, Utc::now()).await
    }

    /// Whether the user has a mute in the scope that is still active at `at`
    pub async fn is_user_muted_at(
        &self,
        user_id: Snowflake,
        scope: ModerationScope,
        at: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .mute_repo()
            .find_active(user_id, scope, at)
            .await?
            .is_some())
    }

    /// Append one moderation log row
    pub async fn log_moderation_action(
        &self,
        action: ModerationAction,
        moderator_id: Snowflake,
        target_id: Snowflake,
        reason: Option<String>,
        metadata: Option<JsonValue>,
    ) -> ServiceResult<ModerationLog> {
        let log = ModerationLog::new(
            self.ctx.generate_id(),
            action,
            moderator_id,
            target_id,
            reason,
            metadata.unwrap_or_else(|| json!({})),
        );
        self.ctx.moderation_log_repo().append(&log).await?;
        Ok(log)
    }

    /// Active mutes of a scope, for its moderators
    #[instrument(skip(self))]
    pub async fn list_active_mutes(
        &self,
        scope: ModerationScope,
        moderator_id: Snowflake,
    ) -> ServiceResult<Vec<UserMute>> {
        self.ensure_moderator(moderator_id, scope).await?;
        Ok(self
            .ctx
            .mute_repo()
            .find_active_by_scope(scope, Utc::now())
            .await?)
    }

    /// Latest moderation decisions about a user or piece of content
    pub async fn history_for_target(
        &self,
        target_id: Snowflake,
        limit: i64,
    ) -> ServiceResult<Vec<ModerationLog>> {
        Ok(self
            .ctx
            .moderation_log_repo()
            .find_by_target(target_id, limit.clamp(1, MAX_HISTORY_LIMIT))
            .await?)
    }
}
