//! Liveness and readiness probes
//!
//! Mounted outside `/api/v1` and outside the rate limiter. Bodies are not
//! enveloped so orchestrators can read them directly.

use axum::{extract::State, http::StatusCode, Json};
use community_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Ready once PostgreSQL answers a trivial query
///
/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let readiness = match community_db::ping(state.pool()).await {
        Ok(()) => ReadinessResponse::ready(true),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe: database unreachable");
            ReadinessResponse::ready(false)
        }
    };

    let status = if readiness.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}
