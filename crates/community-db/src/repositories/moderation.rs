//! PostgreSQL implementations of ModerationLogRepository and MuteRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use community_core::entities::{ModerationLog, UserMute};
use community_core::traits::{ModerationLogRepository, MuteRepository, RepoResult};
use community_core::value_objects::{ModerationScope, Snowflake};

use crate::mappers::UserMuteInsert;
use crate::models::{ModerationLogModel, UserMuteModel};

use super::error::map_db_error;

/// PostgreSQL implementation of ModerationLogRepository
#[derive(Clone)]
pub struct PgModerationLogRepository {
    pool: PgPool,
}

impl PgModerationLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationLogRepository for PgModerationLogRepository {
    #[instrument(skip(self, log), fields(action = %log.action, target_id = %log.target_id))]
    async fn append(&self, log: &ModerationLog) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO moderation_logs (id, moderator_id, target_id, type, reason, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(log.id.into_inner())
        .bind(log.moderator_id.into_inner())
        .bind(log.target_id.into_inner())
        .bind(log.action.as_str())
        .bind(&log.reason)
        .bind(&log.metadata)
        .bind(log.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_target(
        &self,
        target_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationLog>> {
        let limit = limit.clamp(1, 100);

        let rows = sqlx::query_as::<_, ModerationLogModel>(
            r"
            SELECT id, moderator_id, target_id, type, reason, metadata, created_at
            FROM moderation_logs
            WHERE target_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(target_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(ModerationLog::try_from).collect()
    }
}

/// PostgreSQL implementation of MuteRepository
#[derive(Clone)]
pub struct PgMuteRepository {
    pool: PgPool,
}

impl PgMuteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MuteRepository for PgMuteRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserMute>> {
        let result = sqlx::query_as::<_, UserMuteModel>(
            r"
            SELECT id, user_id, room_id, group_id, muted_by, reason, expires_at, created_at
            FROM user_mutes
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserMute::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_active(
        &self,
        user_id: Snowflake,
        scope: ModerationScope,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<UserMute>> {
        let result = sqlx::query_as::<_, UserMuteModel>(
            r"
            SELECT id, user_id, room_id, group_id, muted_by, reason, expires_at, created_at
            FROM user_mutes
            WHERE user_id = $1
              AND room_id IS NOT DISTINCT FROM $2
              AND group_id IS NOT DISTINCT FROM $3
              AND expires_at > $4
            ORDER BY expires_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id.into_inner())
        .bind(scope.room_id().map(Snowflake::into_inner))
        .bind(scope.group_id().map(Snowflake::into_inner))
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserMute::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_active_by_scope(
        &self,
        scope: ModerationScope,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<UserMute>> {
        let rows = sqlx::query_as::<_, UserMuteModel>(
            r"
            SELECT id, user_id, room_id, group_id, muted_by, reason, expires_at, created_at
            FROM user_mutes
            WHERE room_id IS NOT DISTINCT FROM $1
              AND group_id IS NOT DISTINCT FROM $2
              AND expires_at > $3
            ORDER BY expires_at ASC
            ",
        )
        .bind(scope.room_id().map(Snowflake::into_inner))
        .bind(scope.group_id().map(Snowflake::into_inner))
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(UserMute::try_from).collect()
    }

    #[instrument(skip(self, mute), fields(mute_id = %mute.id, scope = %mute.scope))]
    async fn create(&self, mute: &UserMute) -> RepoResult<()> {
        let insert = UserMuteInsert::new(mute);
        sqlx::query(
            r"
            INSERT INTO user_mutes (id, user_id, room_id, group_id, muted_by, reason, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(insert.id)
        .bind(insert.user_id)
        .bind(insert.room_id)
        .bind(insert.group_id)
        .bind(insert.muted_by)
        .bind(insert.reason)
        .bind(insert.expires_at)
        .bind(insert.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, mute), fields(mute_id = %mute.id))]
    async fn extend(&self, mute: &UserMute) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE user_mutes
            SET expires_at = $2, muted_by = $3, reason = $4
            WHERE id = $1
            ",
        )
        .bind(mute.id.into_inner())
        .bind(mute.expires_at)
        .bind(mute.muted_by.into_inner())
        .bind(&mute.reason)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(community_core::DomainError::MuteNotFound(mute.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM user_mutes WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
