//! Value objects - immutable types that represent domain concepts

mod alerting;
mod preferences;
mod scope;
mod snowflake;

pub use alerting::{AlertChannelKind, Severity};
pub use preferences::{NotificationCategory, NotificationPreferences};
pub use scope::{ModerationScope, ScopeKind};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
