//! Error types for the click logging path.
//!
//! Nothing in here ever reaches the visitor: the redirect is produced before
//! any of these can occur, and every variant is logged and discarded at the
//! logger boundary.

use std::time::Duration;

use thiserror::Error;

/// Failures of the best-effort click logging pipeline.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// No collector endpoint is configured.
    #[error("TRACKING_GAS_ENDPOINT not configured, skipping log")]
    Disabled,

    /// The hand-off queue to the background worker is at capacity.
    #[error("click queue is full, event dropped")]
    QueueFull,

    /// The background worker has stopped accepting events.
    #[error("click queue is closed")]
    QueueClosed,

    /// The collector did not answer within the delivery timeout.
    #[error("collector did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection, TLS or body transfer failure.
    #[error("collector request failed: {0}")]
    Transport(String),

    /// The collector answered with a non-success HTTP status.
    #[error("collector answered HTTP {0}")]
    HttpStatus(u16),

    /// The outbound HTTP client could not be constructed.
    #[error("failed to build collector HTTP client: {0}")]
    ClientBuild(String),
}

impl TrackingError {
    /// Short label used for log fields and metric dimensions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::QueueFull => "queue_full",
            Self::QueueClosed => "queue_closed",
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::HttpStatus(_) => "http_status",
            Self::ClientBuild(_) => "client_build",
        }
    }
}

impl From<reqwest::Error> for TrackingError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::HttpStatus(status.as_u16());
        }
        Self::Transport(e.to_string())
    }
}
