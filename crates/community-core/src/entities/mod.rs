//! Domain entities - core business objects

mod audit_log;
mod content;
mod membership;
mod moderation_log;
mod mute;
mod notification;
mod space;
mod user;

pub use audit_log::{
    audit_actions, AuditLogEntry, AuditLogFilter, AuditResult, AuditStats, CountedKey,
};
pub use content::{ContentRef, ContentType, Message, Post};
pub use membership::{MemberRole, Membership};
pub use moderation_log::{ModerationAction, ModerationLog};
pub use mute::UserMute;
pub use notification::{Notification, NotificationType};
pub use space::{Group, Room};
pub use user::{User, UserRole};
