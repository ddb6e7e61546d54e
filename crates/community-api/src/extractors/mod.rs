//! Axum extractors for request handling
//!
//! Custom extractors for authentication, client metadata and validation.

mod auth;
mod client;
mod path;
mod validated;

pub use auth::AuthUser;
pub use client::ClientMeta;
pub use path::{MuteIdPath, NotificationIdPath, SnowflakePath, TargetIdPath};
pub use validated::{OptionalValidatedJson, ValidatedJson, ValidatedQuery};
