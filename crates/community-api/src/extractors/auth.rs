//! Bearer token authentication
//!
//! Tokens come from the platform identity service; this crate only checks
//! them. An expired token answers `TOKEN_EXPIRED` so clients know to refresh.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use community_common::AppError;
use community_core::Snowflake;

use crate::response::ApiError;
use crate::state::AppState;

/// Caller identity taken from a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Snowflake,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let user_id = AppState::from_ref(state)
            .jwt_service()
            .validate_access_token(bearer.token())
            .and_then(|claims| claims.user_id())
            .map_err(token_rejection)?;

        Ok(Self { user_id })
    }
}

fn token_rejection(err: AppError) -> ApiError {
    match err {
        AppError::TokenExpired => ApiError::App(AppError::TokenExpired),
        other => {
            tracing::debug!(error = %other, "Rejected access token");
            ApiError::InvalidToken
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_expired_token_keeps_its_code() {
        let err = token_rejection(AppError::TokenExpired);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), "TOKEN_EXPIRED");
    }

    #[test]
    fn test_other_token_errors_collapse() {
        let err = token_rejection(AppError::InvalidToken);
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }
}
