//! Database models - SQLx-compatible structs for PostgreSQL tables

mod audit_log;
mod content;
mod moderation;
mod notification;
mod space;
mod user;

pub use audit_log::{AuditLogModel, AuditTotalsModel, CountedKeyModel};
pub use content::{MessageModel, PostModel};
pub use moderation::{ModerationLogModel, UserMuteModel};
pub use notification::NotificationModel;
pub use space::{MembershipModel, SpaceModel};
pub use user::UserModel;
