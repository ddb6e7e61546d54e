//! PostgreSQL implementation of NotificationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use community_core::entities::Notification;
use community_core::traits::{NotificationRepository, RepoResult};
use community_core::value_objects::Snowflake;

use crate::mappers::NotificationInsert;
use crate::models::NotificationModel;

use super::error::map_db_error;

/// PostgreSQL implementation of NotificationRepository
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id, kind = %notification.kind))]
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        let insert = NotificationInsert::new(notification);
        sqlx::query(
            r"
            INSERT INTO notifications (id, user_id, title, description, type, action_url, metadata, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(insert.id)
        .bind(insert.user_id)
        .bind(insert.title)
        .bind(insert.description)
        .bind(insert.kind)
        .bind(insert.action_url)
        .bind(&notification.metadata)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_user(
        &self,
        user_id: Snowflake,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationModel>(
            r"
            SELECT id, user_id, title, description, type, action_url, metadata, read, created_at
            FROM notifications
            WHERE user_id = $1 AND ($2 = FALSE OR NOT read)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(user_id.into_inner())
        .bind(unread_only)
        .bind(limit.clamp(1, 100))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count_unread(&self, user_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
