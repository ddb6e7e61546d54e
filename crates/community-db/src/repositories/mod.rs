//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in community-core.

mod audit_log;
mod content;
mod error;
mod moderation;
mod notification;
mod space;
mod user;

pub use audit_log::PgAuditLogRepository;
pub use content::{PgMessageRepository, PgPostRepository};
pub use error::{map_db_error, map_unique_violation};
pub use moderation::{PgModerationLogRepository, PgMuteRepository};
pub use notification::PgNotificationRepository;
pub use space::{PgGroupRepository, PgMembershipRepository, PgRoomRepository};
pub use user::PgUserRepository;
