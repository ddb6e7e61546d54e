//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    AuditLogEntry, AuditLogFilter, AuditStats, Group, Membership, Message, ModerationLog,
    Notification, Post, Room, User, UserMute,
};
use crate::error::DomainError;
use crate::value_objects::{ModerationScope, NotificationPreferences, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Overwrite the notification preference flags of a user
    async fn update_preferences(
        &self,
        id: Snowflake,
        preferences: &NotificationPreferences,
    ) -> RepoResult<()>;
}

// ============================================================================
// Room / Group Repositories
// ============================================================================

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>>;

    async fn create(&self, room: &Room) -> RepoResult<()>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Group>>;

    async fn create(&self, group: &Group) -> RepoResult<()>;
}

// ============================================================================
// Membership Repository
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find the membership of a user in a room or group
    async fn find(&self, scope: ModerationScope, user_id: Snowflake)
        -> RepoResult<Option<Membership>>;

    /// Add a member
    async fn create(&self, membership: &Membership) -> RepoResult<()>;
}

// ============================================================================
// Content Repositories
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>>;

    async fn create(&self, post: &Post) -> RepoResult<()>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    async fn create(&self, message: &Message) -> RepoResult<()>;
}

// ============================================================================
// Moderation Log Repository
// ============================================================================

/// Append-only: there is deliberately no update or delete.
#[async_trait]
pub trait ModerationLogRepository: Send + Sync {
    /// Append one log row
    async fn append(&self, log: &ModerationLog) -> RepoResult<()>;

    /// Most recent entries targeting a user or piece of content
    async fn find_by_target(&self, target_id: Snowflake, limit: i64)
        -> RepoResult<Vec<ModerationLog>>;
}

// ============================================================================
// Mute Repository
// ============================================================================

#[async_trait]
pub trait MuteRepository: Send + Sync {
    /// Find a mute row by ID, expired or not
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserMute>>;

    /// Find the mute of a user in a scope that is still active at `at`
    async fn find_active(
        &self,
        user_id: Snowflake,
        scope: ModerationScope,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<UserMute>>;

    /// All mutes in a scope still active at `at`, soonest expiry first
    async fn find_active_by_scope(
        &self,
        scope: ModerationScope,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<UserMute>>;

    /// Insert a new mute
    async fn create(&self, mute: &UserMute) -> RepoResult<()>;

    /// Update expiry, moderator, and reason of an existing mute
    async fn extend(&self, mute: &UserMute) -> RepoResult<()>;

    /// Remove a mute; returns whether a row was removed
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Audit Log Repository
// ============================================================================

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append one entry
    async fn append(&self, entry: &AuditLogEntry) -> RepoResult<()>;

    /// Page of matching entries, newest first, with the total match count
    async fn query(&self, filter: &AuditLogFilter) -> RepoResult<(Vec<AuditLogEntry>, i64)>;

    /// Aggregate counts within an optional window
    async fn stats(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RepoResult<AuditStats>;

    /// Retention: delete entries with a timestamp before the cutoff
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Notification Repository
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> RepoResult<()>;

    /// Notifications of a user, newest first
    async fn find_by_user(
        &self,
        user_id: Snowflake,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Notification>>;

    async fn count_unread(&self, user_id: Snowflake) -> RepoResult<i64>;

    /// Mark one notification read; `false` if the user owns no such notification
    async fn mark_read(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    async fn mark_all_read(&self, user_id: Snowflake) -> RepoResult<u64>;

    /// Delete one notification; `false` if the user owns no such notification
    async fn delete(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    async fn delete_all(&self, user_id: Snowflake) -> RepoResult<u64>;
}
