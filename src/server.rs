//! HTTP server initialization and runtime setup.
//!
//! Handles collector client setup, worker spawning, and Axum server lifecycle.

use crate::application::services::TrackingService;
use crate::config::{Config, mask_endpoint};
use crate::domain::click_worker::run_click_worker;
use crate::domain::redirect::RedirectDecision;
use crate::infrastructure::collector::HttpCollector;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Application state plus the handle of the click worker it feeds.
pub struct Runtime {
    pub state: AppState,
    /// `None` when click logging is disabled.
    pub worker: Option<JoinHandle<()>>,
}

/// Builds the application state from configuration.
///
/// Spawns the click worker when a collector endpoint is configured; the
/// worker stops once every clone of the returned state has been dropped.
///
/// # Errors
///
/// Returns an error if the endpoint is malformed or the HTTP client cannot
/// be built.
pub fn build_runtime(config: &Config) -> Result<Runtime> {
    let redirect = RedirectDecision::resolve(Some(&config.destination_url));

    let (tracking, worker) = match config.tracking_endpoint_url()? {
        Some(endpoint) => {
            let collector = HttpCollector::new(endpoint, config.tracking_timeout())?;
            let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

            let worker = tokio::spawn(run_click_worker(
                click_rx,
                Arc::new(collector),
                config.click_worker_concurrency,
            ));
            tracing::info!(
                "Click worker started (collector: {})",
                config
                    .tracking_endpoint
                    .as_deref()
                    .map(mask_endpoint)
                    .unwrap_or_default()
            );

            (TrackingService::new(click_tx), Some(worker))
        }
        None => {
            tracing::warn!("TRACKING_GAS_ENDPOINT not configured, click logging disabled");
            (TrackingService::disabled(), None)
        }
    };

    Ok(Runtime {
        state: AppState::new(redirect, tracking),
        worker,
    })
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Collector client and background click worker
/// - Axum HTTP server with connect info (peer address fallback for client IP)
///
/// On Ctrl-C / SIGTERM the listener stops accepting, the click queue is
/// closed and pending deliveries get `SHUTDOWN_DRAIN_SECS` to finish.
///
/// # Errors
///
/// Returns an error if:
/// - Collector client construction fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let Runtime { state, worker } = build_runtime(&config)?;

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    if let Some(worker) = worker {
        drain_worker(worker, config.shutdown_drain()).await;
    }

    Ok(())
}

/// Waits for the click worker to finish pending deliveries.
///
/// Events still queued when the deadline passes are lost.
async fn drain_worker(worker: JoinHandle<()>, deadline: std::time::Duration) {
    match tokio::time::timeout(deadline, worker).await {
        Ok(Ok(())) => tracing::info!("Click queue drained"),
        Ok(Err(e)) => tracing::error!("Click worker panicked: {}", e),
        Err(_) => tracing::warn!(
            "Click queue not drained within {}s, pending events dropped",
            deadline.as_secs()
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_runtime_without_endpoint() {
        let runtime = build_runtime(&Config::default()).unwrap();

        assert!(runtime.worker.is_none());
        assert!(!runtime.state.tracking.is_enabled());
        assert_eq!(
            runtime.state.redirect.destination(),
            crate::domain::redirect::DEFAULT_DESTINATION_URL
        );
    }

    #[tokio::test]
    async fn test_build_runtime_with_endpoint_spawns_worker() {
        let config = Config {
            destination_url: "https://example.com/home".to_string(),
            tracking_endpoint: Some("http://127.0.0.1:9/collect".to_string()),
            ..Config::default()
        };

        let Runtime { state, worker } = build_runtime(&config).unwrap();
        let worker = worker.expect("worker should be spawned");

        assert!(state.tracking.is_enabled());
        assert_eq!(state.redirect.destination(), "https://example.com/home");

        // Dropping the last sender stops the worker.
        drop(state);
        tokio::time::timeout(std::time::Duration::from_secs(1), worker)
            .await
            .unwrap()
            .unwrap();
    }
}
