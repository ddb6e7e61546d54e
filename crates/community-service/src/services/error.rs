//! Errors returned by the service layer

use community_common::{domain_status, AppError};
use community_core::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Moderation rule violation or repository failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => domain_status(e),
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Caller was refused on authorization grounds
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::Domain(e) | Self::App(AppError::Domain(e)) => e.is_authorization(),
            _ => false,
        }
    }

    /// The store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Domain(e) | Self::App(AppError::Domain(e)) => e.is_unavailable(),
            Self::App(AppError::Unavailable(_)) => true,
            _ => false,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use community_core::{ModerationScope, Snowflake};

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Mute", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Mute not found: 123");
    }

    #[test]
    fn test_domain_errors_keep_their_codes() {
        let err: ServiceError =
            DomainError::NotModerator(ModerationScope::Room(Snowflake::new(4))).into();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "NOT_MODERATOR");
        assert!(err.is_authorization());

        let err: ServiceError = DomainError::SelfModeration.into();
        assert_eq!(err.status_code(), 400);
        assert!(!err.is_authorization());
    }

    #[test]
    fn test_unavailable_is_detected() {
        let err: ServiceError = DomainError::DatabaseUnavailable("pool timed out".into()).into();
        assert!(err.is_unavailable());
        assert_eq!(err.status_code(), 503);

        let err: ServiceError = DomainError::DatabaseError("syntax".into()).into();
        assert!(!err.is_unavailable());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::not_found("Notification", "456").into();
        assert_eq!(app_err.status_code(), 404);

        let app_err: AppError = ServiceError::validation("bad").into();
        assert_eq!(app_err.error_code(), "VALIDATION_ERROR");
    }
}
