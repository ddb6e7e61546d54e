//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{ModerationScope, Snowflake};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Room not found: {0}")]
    RoomNotFound(Snowflake),

    #[error("Group not found: {0}")]
    GroupNotFound(Snowflake),

    #[error("Post not found: {0}")]
    PostNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Mute not found: {0}")]
    MuteNotFound(Snowflake),

    #[error("Notification not found: {0}")]
    NotificationNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Moderators cannot moderate themselves")]
    SelfModeration,

    #[error("User {user_id} is not a member of {scope}")]
    NotAMember {
        user_id: Snowflake,
        scope: ModerationScope,
    },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a moderator of {0}")]
    NotModerator(ModerationScope),

    #[error("Administrator role required")]
    NotAdmin,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a member of {0}")]
    AlreadyMember(ModerationScope),

    #[error("Email already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::GroupNotFound(_) => "UNKNOWN_GROUP",
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::MuteNotFound(_) => "UNKNOWN_MUTE",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::SelfModeration => "SELF_MODERATION",
            Self::NotAMember { .. } => "NOT_A_MEMBER",

            Self::NotModerator(_) => "NOT_MODERATOR",
            Self::NotAdmin => "NOT_ADMIN",

            Self::AlreadyMember(_) => "ALREADY_MEMBER",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            Self::DatabaseUnavailable(_) => "DATABASE_UNAVAILABLE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::RoomNotFound(_)
                | Self::GroupNotFound(_)
                | Self::PostNotFound(_)
                | Self::MessageNotFound(_)
                | Self::MuteNotFound(_)
                | Self::NotificationNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::SelfModeration | Self::NotAMember { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotModerator(_) | Self::NotAdmin)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyMember(_) | Self::EmailAlreadyExists)
    }

    /// Store could not be reached at all (pool timeout, io)
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::DatabaseUnavailable(_))
    }
}

/// A stored or submitted string did not name a known enum variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl From<ParseEnumError> for DomainError {
    fn from(err: ParseEnumError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
