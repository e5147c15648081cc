//! Click logging front door used by the redirect handler.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::domain::click_event::ClickEvent;
use crate::domain::request_context::RequestContext;
use crate::error::TrackingError;

/// Hands click events to the background worker without ever blocking.
///
/// Holds no sender when no collector endpoint is configured; every
/// submission is then skipped with an operator warning and no payload is
/// built.
#[derive(Clone)]
pub struct TrackingService {
    sender: Option<mpsc::Sender<ClickEvent>>,
}

impl TrackingService {
    /// Creates a service feeding the given worker queue.
    pub fn new(sender: mpsc::Sender<ClickEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Creates a service that never logs.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Captures a click event for `ctx` and queues it for delivery.
    ///
    /// Returns immediately. Errors are for the caller to log; they never
    /// affect the redirect.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::Disabled`] if no collector is configured
    /// - [`TrackingError::QueueFull`] if the worker is saturated (event dropped)
    /// - [`TrackingError::QueueClosed`] if the worker has stopped
    pub fn track(&self, ctx: &RequestContext) -> Result<(), TrackingError> {
        let sender = self.sender.as_ref().ok_or(TrackingError::Disabled)?;
        let event = ClickEvent::capture_now(ctx);

        sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => TrackingError::QueueFull,
            TrySendError::Closed(_) => TrackingError::QueueClosed,
        })
    }

    /// [`Self::track`] with the outcome reported to operators.
    pub fn track_and_report(&self, ctx: &RequestContext) {
        match self.track(ctx) {
            Ok(()) => {}
            Err(TrackingError::Disabled) => {
                warn!("{}", TrackingError::Disabled);
            }
            Err(e) => {
                metrics::counter!("click_events_dropped_total", "reason" => e.kind())
                    .increment(1);
                warn!(error = %e, "Click event not queued: {}", e);
            }
        }
    }

    /// `(is_closed, remaining_capacity)` of the worker queue, if enabled.
    pub fn queue_status(&self) -> Option<(bool, usize)> {
        self.sender
            .as_ref()
            .map(|sender| (sender.is_closed(), sender.capacity()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn ctx(uri: &str) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 5.6.7.8"));
        RequestContext::new(&uri.parse().unwrap(), headers, None)
    }

    #[test]
    fn test_disabled_service_skips() {
        let service = TrackingService::disabled();

        assert!(!service.is_enabled());
        assert!(matches!(
            service.track(&ctx("/api/r?src=linkedin")),
            Err(TrackingError::Disabled)
        ));
        assert!(service.queue_status().is_none());
    }

    #[test]
    fn test_track_queues_captured_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let service = TrackingService::new(tx);

        service.track(&ctx("/api/r?src=linkedin&utm_source=email")).unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.source, "linkedin");
        assert_eq!(event.utm.source, "email");
        assert_eq!(event.client_ip, "1.2.3.4");
    }

    #[test]
    fn test_track_reports_full_queue() {
        let (tx, _rx) = mpsc::channel(1);
        let service = TrackingService::new(tx);

        service.track(&ctx("/api/r?src=a")).unwrap();
        assert!(matches!(
            service.track(&ctx("/api/r?src=b")),
            Err(TrackingError::QueueFull)
        ));
    }

    #[test]
    fn test_track_reports_closed_queue() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let service = TrackingService::new(tx);

        assert!(matches!(
            service.track(&ctx("/api/r")),
            Err(TrackingError::QueueClosed)
        ));
        assert!(matches!(service.queue_status(), Some((true, _))));
    }

    #[test]
    fn test_same_request_twice_yields_two_events() {
        let (tx, mut rx) = mpsc::channel(4);
        let service = TrackingService::new(tx);
        let request = ctx("/api/r?src=linkedin");

        service.track(&request).unwrap();
        service.track(&request).unwrap();

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.source, second.source);
        assert!(second.timestamp >= first.timestamp);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_track_and_report_never_panics() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        TrackingService::new(tx).track_and_report(&ctx("/api/r"));
        TrackingService::disabled().track_and_report(&ctx("/api/r"));
    }

    #[test]
    fn test_disabled_warning_text() {
        assert_eq!(
            TrackingError::Disabled.to_string(),
            "TRACKING_GAS_ENDPOINT not configured, skipping log"
        );
    }
}
