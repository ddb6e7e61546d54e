//! Entity to model mappers
//!
//! Conversions between domain entities (community-core) and database models.
//! - `TryFrom<Model> for Entity`: text columns are parsed back into enums;
//!   a value outside the enum is reported as a database error
//! - `*Insert` structs: flatten entity data into bindable columns

mod audit_log;
mod content;
mod moderation;
mod notification;
mod space;
mod user;

pub use audit_log::AuditLogInsert;
pub use moderation::UserMuteInsert;
pub use notification::NotificationInsert;
pub use space::membership_from_model;
pub use user::UserInsert;

use std::str::FromStr;

use community_core::{DomainError, ParseEnumError};

/// Parse a text column that must hold one of an enum's wire names
pub(crate) fn parse_column<T>(value: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = ParseEnumError>,
{
    value
        .parse()
        .map_err(|e: ParseEnumError| DomainError::DatabaseError(format!("corrupt row: {e}")))
}
