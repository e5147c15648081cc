//! Collector sink trait and response vocabulary.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

use crate::domain::click_event::ClickEvent;
use crate::error::TrackingError;

/// Outcome reported by the collector for an accepted HTTP exchange.
///
/// None of these affect the redirect, which has already been sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorStatus {
    /// `{"status": "ok"}` - the click was stored.
    Accepted,
    /// `{"status": "duplicate"}` - the collector recognised a re-fire.
    Duplicate,
    /// Any other status value. `None` when the body was not JSON or had no
    /// `status` field.
    Unrecognized(Option<String>),
}

#[derive(Deserialize)]
struct CollectorReply {
    status: Option<serde_json::Value>,
}

impl CollectorStatus {
    /// Interprets a collector response body.
    ///
    /// Never fails: malformed bodies map to `Unrecognized(None)`.
    pub fn from_body(body: &[u8]) -> Self {
        let status = serde_json::from_slice::<CollectorReply>(body)
            .ok()
            .and_then(|reply| reply.status);

        match status {
            Some(serde_json::Value::String(s)) if s == "ok" => Self::Accepted,
            Some(serde_json::Value::String(s)) if s == "duplicate" => Self::Duplicate,
            Some(serde_json::Value::String(s)) => Self::Unrecognized(Some(s)),
            Some(other) => Self::Unrecognized(Some(other.to_string())),
            None => Self::Unrecognized(None),
        }
    }

    /// Short label used for log fields and metric dimensions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "ok",
            Self::Duplicate => "duplicate",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Display for CollectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "ok"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::Unrecognized(Some(s)) => write!(f, "{}", s),
            Self::Unrecognized(None) => write!(f, "<missing>"),
        }
    }
}

/// Destination for captured click events.
///
/// Implementations make exactly one delivery attempt per call and must bound
/// it in time. Retries are deliberately absent: click logging is best-effort
/// and the caller discards every error after logging it.
///
/// # Implementations
///
/// - [`crate::infrastructure::collector::HttpCollector`] - JSON POST over HTTP(S)
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickSink: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Timeout`], [`TrackingError::Transport`] or
    /// [`TrackingError::HttpStatus`] when the collector is unavailable.
    async fn deliver(&self, event: &ClickEvent) -> Result<CollectorStatus, TrackingError>;
}
