//! Background delivery of click events.

use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::infrastructure::collector::{ClickSink, CollectorStatus};

/// Drains the click queue and delivers each event to `sink`.
///
/// Up to `concurrency` deliveries run at once. Each event gets exactly one
/// attempt; failures are logged and dropped. When every sender is gone the
/// worker waits for in-flight deliveries, then returns, which lets the
/// server drain the queue on shutdown.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    sink: Arc<dyn ClickSink>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let sink = sink.clone();

        in_flight.spawn(async move {
            deliver_click(sink.as_ref(), &event).await;
            drop(permit);
        });

        // Reap finished tasks so the set does not grow with traffic.
        while in_flight.try_join_next().is_some() {}
    }

    let pending = in_flight.len();
    if pending > 0 {
        info!(pending, "Click queue closed, waiting for in-flight deliveries");
    }
    while in_flight.join_next().await.is_some() {}

    info!("Click worker stopped");
}

/// Makes one delivery attempt and reports the outcome to operators.
///
/// Never fails: every error ends here.
pub async fn deliver_click(sink: &dyn ClickSink, event: &ClickEvent) {
    match sink.deliver(event).await {
        Ok(status) => {
            metrics::counter!("click_deliveries_total", "outcome" => status.label()).increment(1);
            match status {
                CollectorStatus::Accepted => {
                    info!(src = %event.source, ip = %event.client_ip, "Click logged: {} from {}", event.source, event.client_ip);
                }
                CollectorStatus::Duplicate => {
                    info!(src = %event.source, ip = %event.client_ip, "Duplicate ignored: {} from {}", event.source, event.client_ip);
                }
                CollectorStatus::Unrecognized(_) => {
                    warn!(src = %event.source, status = %status, "Unknown collector status: {}", status);
                }
            }
        }
        Err(e) => {
            metrics::counter!("click_deliveries_total", "outcome" => e.kind()).increment(1);
            error!(src = %event.source, error = %e, "Failed to log click: {}", e);
        }
    }
}
