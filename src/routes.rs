//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `ANY  /api/r`   - Tracking-link redirect (public, every method answered)
//! - `GET  /health`  - Health check: click queue, collector configuration
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling (`/api/r/` redirects too)

use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::{any, get};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Path of the tracking endpoint.
pub const TRACKING_PATH: &str = "/api/r";

/// Routes with state and tracing applied, without path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(TRACKING_PATH, any(redirect_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
