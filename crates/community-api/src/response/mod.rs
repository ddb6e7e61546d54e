//! Response types and error handling for API endpoints
//!
//! Every body is an envelope: `{"success": true, "data": ...}` on success and
//! `{"success": false, "error": {...}, "request_id": ...}` on failure. The
//! request id is filled in by the error envelope middleware.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use community_common::AppError;
use community_core::DomainError;
use community_service::ServiceError;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Domain(e) => community_common::domain_status(e),
            Self::Validation(_)
            | Self::InvalidPath(_)
            | Self::InvalidQuery(_)
            | Self::InvalidBody(_) => 400,
            Self::MissingAuth | Self::InvalidToken => 401,
            Self::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::Validation(_) | Self::InvalidBody(_) => "VALIDATION_ERROR",
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY_PARAMETER",
            Self::MissingAuth => "MISSING_AUTHORIZATION",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The database could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Service(e) => e.is_unavailable(),
            Self::Domain(e) => e.is_unavailable(),
            Self::App(AppError::Unavailable(_)) => true,
            Self::App(AppError::Domain(e)) => e.is_unavailable(),
            _ => false,
        }
    }

    /// The caller lacked a required role
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::Service(e) => e.is_authorization(),
            Self::Domain(e) => e.is_authorization(),
            Self::App(e) => e.status_code() == 403,
            _ => false,
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
    pub request_id: Option<String>,
}

/// Error detail for API responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Attached to every error response so the envelope middleware can add the
/// request id and report server errors
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub detail: ErrorDetail,
    pub unavailable: bool,
}

impl ErrorReport {
    pub fn into_body(self, request_id: Option<String>) -> ErrorBody {
        ErrorBody {
            success: false,
            error: self.detail,
            request_id,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let details = if let Self::Validation(errors) = &self {
            Some(serde_json::to_value(errors).unwrap_or_default())
        } else {
            None
        };

        // Internal sources never reach the client
        let message = if status.is_server_error() && !self.is_unavailable() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let report = ErrorReport {
            detail: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                details,
            },
            unavailable: self.is_unavailable(),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "Server error occurred");
        }

        let mut response = (status, Json(report.clone().into_body(None))).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Wrapper for successful JSON responses
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(Envelope {
            success: true,
            data: self.0,
        })
        .into_response()
    }
}

/// Created response (201) with JSON body
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        *response.status_mut() = StatusCode::CREATED;
        response
    }
}

/// No content response (204)
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
