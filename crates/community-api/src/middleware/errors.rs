//! Error envelope middleware
//!
//! Adds the request id to every error body, classifies failed requests
//! through the error logger and flags slow requests.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use community_service::services::LogOptions;
use community_service::{ErrorLogger, RequestMeta};
use serde_json::json;

use crate::extractors::ClientMeta;
use crate::response::{ErrorBody, ErrorDetail, ErrorReport};
use crate::state::AppState;

pub async fn error_envelope(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let ClientMeta(meta) = ClientMeta::from_parts(&parts);
    let request = Request::from_parts(parts, body);

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed();

    let logger = ErrorLogger::new(state.service_context());
    if elapsed >= state.config().observability.slow_request_threshold() {
        logger.slow_request(meta.clone(), elapsed).await;
    }

    let status = response.status();
    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let ip = meta.ip_address.clone();
            let request_id = meta.request_id.clone();
            logger.rate_limit_exceeded(&ip, Some(meta)).await;
            return rewrite_body(response, rate_limited_report().into_body(request_id));
        }
        if status.is_server_error() {
            report_bare_status(&logger, status, meta).await;
        }
        return response;
    };

    match status {
        StatusCode::UNAUTHORIZED => {
            logger
                .authentication_error(&report.detail.message, Some(meta.clone()))
                .await;
        }
        StatusCode::BAD_REQUEST if report.detail.code == "VALIDATION_ERROR" => {
            logger
                .validation_error(None, &report.detail.message, Some(meta.clone()))
                .await;
        }
        s if s.is_server_error() => report_server_error(&logger, &report, meta.clone()).await,
        _ => {}
    }

    rewrite_body(response, report.into_body(meta.request_id))
}

/// Swap the body, keeping status and headers
fn rewrite_body(response: Response, body: ErrorBody) -> Response {
    let bytes = match serde_json::to_vec(&body) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize error body");
            return response;
        }
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(bytes))
}

fn rate_limited_report() -> ErrorReport {
    ErrorReport {
        detail: ErrorDetail {
            code: "RATE_LIMIT_EXCEEDED".to_string(),
            message: "Too many requests".to_string(),
            details: None,
        },
        unavailable: false,
    }
}

async fn report_server_error(logger: &ErrorLogger<'_>, report: &ErrorReport, meta: RequestMeta) {
    let options = LogOptions::default().with_request(meta);
    if report.unavailable {
        logger
            .critical(&report.detail.code, &report.detail.message, None, options)
            .await;
    } else {
        logger
            .error(&report.detail.code, &report.detail.message, None, options)
            .await;
    }
}

/// Server errors produced outside the handlers, e.g. the timeout layer
async fn report_bare_status(logger: &ErrorLogger<'_>, status: StatusCode, meta: RequestMeta) {
    logger
        .error(
            "HTTP_SERVER_ERROR",
            status.canonical_reason().unwrap_or("Server error"),
            None,
            LogOptions::default()
                .with_request(meta)
                .with_context(json!({ "status": status.as_u16() })),
        )
        .await;
}
