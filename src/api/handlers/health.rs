//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Redirects are served and the click queue (if any) accepts events
/// - **503 Service Unavailable**: The click worker has stopped
///
/// The collector itself is not probed: a slow or failing collector never
/// affects redirects, so it does not make the service unhealthy.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "click_queue": { "status": "ok", "message": "Capacity: 10000" },
///     "collector": { "status": "ok", "message": "Click logging enabled" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let queue_check = check_click_queue(&state);
    let collector_check = check_collector(&state);

    let all_healthy = queue_check.is_healthy() && collector_check.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            click_queue: queue_check,
            collector: collector_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks if the click tracking queue is operational.
fn check_click_queue(state: &AppState) -> CheckStatus {
    match state.tracking.queue_status() {
        None => CheckStatus::new("disabled", "Click logging disabled"),
        Some((true, _)) => CheckStatus::new("error", "Click queue is closed"),
        Some((false, capacity)) => CheckStatus::new("ok", format!("Capacity: {}", capacity)),
    }
}

/// Reports whether a collector endpoint is configured.
fn check_collector(state: &AppState) -> CheckStatus {
    if state.tracking.is_enabled() {
        CheckStatus::new("ok", "Click logging enabled")
    } else {
        CheckStatus::new("disabled", "TRACKING_GAS_ENDPOINT not configured")
    }
}
