//! PostgreSQL implementations of PostRepository and MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use community_core::entities::{Message, Post};
use community_core::traits::{MessageRepository, PostRepository, RepoResult};
use community_core::value_objects::Snowflake;

use crate::models::{MessageModel, PostModel};

use super::error::map_db_error;

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(
            r"
            SELECT id, group_id, author_id, title, created_at
            FROM posts
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create(&self, post: &Post) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO posts (id, group_id, author_id, title, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(post.id.into_inner())
        .bind(post.group_id.map(Snowflake::into_inner))
        .bind(post.author_id.into_inner())
        .bind(&post.title)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, room_id, group_id, author_id, content, created_at
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO messages (id, room_id, group_id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.room_id.map(Snowflake::into_inner))
        .bind(message.group_id.map(Snowflake::into_inner))
        .bind(message.author_id.into_inner())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
