//! Middleware stack for the API server
//!
//! Provides logging, request ID generation, CORS, rate limiting, and the
//! error envelope.

mod errors;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::from_fn_with_state,
    Router,
};
use community_common::{CorsConfig, Environment};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub use errors::error_envelope;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Apply the middleware stack to the API router
///
/// Request order: request id, tracing, error envelope, rate limit, timeout,
/// CORS, handler.
pub fn apply_middleware(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let config = state.config();
    let rate_limit = &config.rate_limit;

    // One token back every 1000/rps ms, global bucket
    let replenish_ms = (1000 / u64::from(rate_limit.requests_per_second.max(1))).max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(rate_limit.burst.max(1))
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .expect("Failed to create rate limiter configuration"),
    );

    router
        .layer(cors_layer(&config.cors, config.app.env))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            REQUEST_TIMEOUT,
        ))
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(from_fn_with_state(state.clone(), error_envelope))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(header::HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
}

/// CORS for the configured origins
///
/// With no origins configured, production blocks cross-origin browsers and
/// development allows any origin.
fn cors_layer(config: &CorsConfig, environment: Environment) -> CorsLayer {
    let request_id = header::HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id.clone(),
        ])
        .expose_headers([request_id, header::RETRY_AFTER]);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        tracing::info!(count = origins.len(), "CORS: allowing configured origins");
        layer.allow_origin(AllowOrigin::list(origins))
    } else if environment.is_production() {
        tracing::warn!("CORS: no origins configured, cross-origin requests will be blocked");
        layer.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
    } else {
        tracing::warn!(env = environment.as_str(), "CORS: allowing any origin");
        layer.allow_origin(Any)
    }
}
