//! # community-core
//!
//! Domain layer containing entities, value objects, and repository traits for
//! community moderation, notifications, and auditing.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    audit_actions, AuditLogEntry, AuditLogFilter, AuditResult, AuditStats, ContentRef,
    ContentType, CountedKey, Group, MemberRole, Membership, Message, ModerationAction,
    ModerationLog, Notification, NotificationType, Post, Room, User, UserMute, UserRole,
};
pub use error::{DomainError, ParseEnumError};
pub use traits::{
    AuditLogRepository, GroupRepository, MembershipRepository, MessageRepository,
    ModerationLogRepository, MuteRepository, NotificationRepository, PostRepository, RepoResult,
    RoomRepository, UserRepository,
};
pub use value_objects::{
    AlertChannelKind, ModerationScope, NotificationCategory, NotificationPreferences, ScopeKind,
    Severity, Snowflake, SnowflakeGenerator, SnowflakeParseError,
};
