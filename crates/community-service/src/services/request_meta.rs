//! Client metadata extracted from an inbound request

use serde::Serialize;

/// Placeholder for headers the client did not send
pub const UNKNOWN: &str = "unknown";

/// Who sent a request and where it went, for audit and error entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMeta {
    pub ip_address: String,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl RequestMeta {
    /// Resolve client metadata from a header lookup.
    ///
    /// The IP is taken from the first hop of `x-forwarded-for`, then
    /// `x-real-ip`, then `cf-connecting-ip`, else `"unknown"`.
    pub fn from_headers<F>(header: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            header(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
            .filter(|v| !v.is_empty())
            .or_else(|| non_empty("x-real-ip"))
            .or_else(|| non_empty("cf-connecting-ip"))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            ip_address,
            user_agent: non_empty("user-agent").unwrap_or_else(|| UNKNOWN.to_string()),
            request_id: non_empty("x-request-id"),
            endpoint: None,
            method: None,
        }
    }

    /// Metadata for work not triggered by a request
    pub fn internal() -> Self {
        Self {
            ip_address: UNKNOWN.to_string(),
            user_agent: UNKNOWN.to_string(),
            request_id: None,
            endpoint: None,
            method: None,
        }
    }

    #[must_use]
    pub fn with_route(mut self, method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
