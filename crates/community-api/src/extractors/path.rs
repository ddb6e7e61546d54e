//! Path parameter extractors
//!
//! Type-safe extraction of Snowflake IDs from path parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use community_core::Snowflake;
use serde::de::DeserializeOwned;

use crate::response::ApiError;

/// Path extractor whose rejection uses the API error envelope
#[derive(Debug, Clone)]
pub struct SnowflakePath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for SnowflakePath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        Ok(SnowflakePath(inner))
    }
}

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with mute_id
#[derive(Debug, serde::Deserialize)]
pub struct MuteIdPath {
    pub mute_id: String,
}

impl MuteIdPath {
    pub fn mute_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.mute_id, "mute_id")
    }
}

/// Path parameters with notification_id
#[derive(Debug, serde::Deserialize)]
pub struct NotificationIdPath {
    pub notification_id: String,
}

impl NotificationIdPath {
    pub fn notification_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.notification_id, "notification_id")
    }
}

/// Path parameters with target_id (a user or a piece of content)
#[derive(Debug, serde::Deserialize)]
pub struct TargetIdPath {
    pub target_id: String,
}

impl TargetIdPath {
    pub fn target_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.target_id, "target_id")
    }
}
