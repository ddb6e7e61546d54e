//! Client metadata extractor

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use community_service::RequestMeta;

/// Who sent the request, for audit and error entries
#[derive(Debug, Clone)]
pub struct ClientMeta(pub RequestMeta);

impl ClientMeta {
    pub fn from_parts(parts: &Parts) -> Self {
        let meta = RequestMeta::from_headers(|name| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .with_route(parts.method.as_str(), parts.uri.path());
        Self(meta)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_client_meta_from_parts() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/moderation/mutes?x=1")
            .header("x-real-ip", "198.51.100.4")
            .header("user-agent", "curl/8")
            .header("x-request-id", "abc")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();

        let ClientMeta(meta) = ClientMeta::from_parts(&parts);

        assert_eq!(meta.ip_address, "198.51.100.4");
        assert_eq!(meta.user_agent, "curl/8");
        assert_eq!(meta.request_id.as_deref(), Some("abc"));
        assert_eq!(meta.endpoint.as_deref(), Some("/api/v1/moderation/mutes"));
        assert_eq!(meta.method.as_deref(), Some("POST"));
    }

    #[test]
    fn test_missing_headers_are_unknown() {
        let (parts, ()) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let ClientMeta(meta) = ClientMeta::from_parts(&parts);
        assert_eq!(meta.ip_address, "unknown");
        assert_eq!(meta.user_agent, "unknown");
    }
}
