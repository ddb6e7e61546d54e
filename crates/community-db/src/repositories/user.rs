//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use community_core::entities::User;
use community_core::error::DomainError;
use community_core::traits::{RepoResult, UserRepository};
use community_core::value_objects::{NotificationPreferences, Snowflake};

use crate::mappers::UserInsert;
use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, username, email, role,
                   community_comments, community_reactions, community_mentions,
                   community_group_updates, community_moderation,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(User::try_from).transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> RepoResult<()> {
        let insert = UserInsert::new(user);
        sqlx::query(
            r"
            INSERT INTO users (id, username, email, role,
                               community_comments, community_reactions, community_mentions,
                               community_group_updates, community_moderation,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(insert.id)
        .bind(insert.username)
        .bind(insert.email)
        .bind(insert.role)
        .bind(insert.preferences.community_comments)
        .bind(insert.preferences.community_reactions)
        .bind(insert.preferences.community_mentions)
        .bind(insert.preferences.community_group_updates)
        .bind(insert.preferences.community_moderation)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_preferences(
        &self,
        id: Snowflake,
        preferences: &NotificationPreferences,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET community_comments = $2,
                community_reactions = $3,
                community_mentions = $4,
                community_group_updates = $5,
                community_moderation = $6,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(preferences.community_comments)
        .bind(preferences.community_reactions)
        .bind(preferences.community_mentions)
        .bind(preferences.community_group_updates)
        .bind(preferences.community_moderation)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        Ok(())
    }
}
