//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::TrackingService;
use crate::domain::redirect::RedirectDecision;

/// Read-only per-process state.
///
/// Cloned into every request; holds no mutable data beyond the click queue
/// sender.
#[derive(Clone)]
pub struct AppState {
    /// Configured destination, with the default already applied.
    pub redirect: Arc<RedirectDecision>,
    pub tracking: TrackingService,
}

impl AppState {
    pub fn new(redirect: RedirectDecision, tracking: TrackingService) -> Self {
        Self {
            redirect: Arc::new(redirect),
            tracking,
        }
    }
}
