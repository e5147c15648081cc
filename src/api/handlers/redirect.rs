//! Handler for tracking-link redirects.

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};

use crate::domain::request_context::RequestContext;
use crate::state::AppState;

/// Redirects a tracking link and queues its click for logging.
///
/// # Endpoint
///
/// `GET /api/r?src=<tag>&utm_source=..&utm_medium=..&utm_campaign=..`
///
/// Any other method on the same path is redirected the same way.
///
/// # Request Flow
///
/// 1. Take the configured destination
/// 2. Capture a click event and hand it to the background worker (non-blocking)
/// 3. Return 302 Found with `Cache-Control: no-cache, no-store, must-revalidate`
///
/// # Click Tracking
///
/// Events go to a bounded channel. If logging is disabled, the queue is
/// full or the worker has stopped, the click is dropped and a warning is
/// logged. The collector exchange happens on the worker after this handler
/// has returned.
///
/// # Errors
///
/// None. Every request is redirected.
pub async fn redirect_handler(State(state): State<AppState>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();
    let decision = state.redirect.as_ref().clone();

    metrics::counter!("redirects_total").increment(1);

    let ctx = RequestContext::from_parts(&parts);
    state.tracking.track_and_report(&ctx);

    decision.into_response()
}
