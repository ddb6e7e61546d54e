//! PostgreSQL implementations of RoomRepository, GroupRepository, and MembershipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use community_core::entities::{Group, Membership, Room};
use community_core::error::DomainError;
use community_core::traits::{GroupRepository, MembershipRepository, RepoResult, RoomRepository};
use community_core::value_objects::{ModerationScope, Snowflake};

use crate::mappers::membership_from_model;
use crate::models::{MembershipModel, SpaceModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of RoomRepository
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>> {
        let result = sqlx::query_as::<_, SpaceModel>(
            r"
            SELECT id, name, created_by, created_at
            FROM rooms
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn create(&self, room: &Room) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO rooms (id, name, created_by, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(room.id.into_inner())
        .bind(&room.name)
        .bind(room.created_by.into_inner())
        .bind(room.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

/// PostgreSQL implementation of GroupRepository
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Group>> {
        let result = sqlx::query_as::<_, SpaceModel>(
            r"
            SELECT id, name, created_by, created_at
            FROM groups
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Group::from))
    }

    #[instrument(skip(self, group), fields(group_id = %group.id))]
    async fn create(&self, group: &Group) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO groups (id, name, created_by, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(group.id.into_inner())
        .bind(&group.name)
        .bind(group.created_by.into_inner())
        .bind(group.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

/// PostgreSQL implementation of MembershipRepository over room_members and group_members
#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        scope: ModerationScope,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>> {
        let sql = match scope {
            ModerationScope::Room(_) => {
                r"
                SELECT room_id AS space_id, user_id, role, joined_at
                FROM room_members
                WHERE room_id = $1 AND user_id = $2
                "
            }
            ModerationScope::Group(_) => {
                r"
                SELECT group_id AS space_id, user_id, role, joined_at
                FROM group_members
                WHERE group_id = $1 AND user_id = $2
                "
            }
        };

        let result = sqlx::query_as::<_, MembershipModel>(sql)
            .bind(scope.id().into_inner())
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result
            .map(|model| membership_from_model(model, scope.kind()))
            .transpose()
    }

    #[instrument(skip(self, membership), fields(scope = %membership.scope, user_id = %membership.user_id))]
    async fn create(&self, membership: &Membership) -> RepoResult<()> {
        let sql = match membership.scope {
            ModerationScope::Room(_) => {
                r"
                INSERT INTO room_members (room_id, user_id, role, joined_at)
                VALUES ($1, $2, $3, $4)
                "
            }
            ModerationScope::Group(_) => {
                r"
                INSERT INTO group_members (group_id, user_id, role, joined_at)
                VALUES ($1, $2, $3, $4)
                "
            }
        };

        sqlx::query(sql)
            .bind(membership.scope.id().into_inner())
            .bind(membership.user_id.into_inner())
            .bind(membership.role.as_str())
            .bind(membership.joined_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember(membership.scope)))?;

        Ok(())
    }
}
