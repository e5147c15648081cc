//! HTTP collector implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::service::{ClickSink, CollectorStatus};
use crate::domain::click_event::ClickEvent;
use crate::error::TrackingError;

/// Posts click events as JSON to a web app endpoint (a Google Apps Script
/// deployment in the reference setup).
///
/// Every request is bounded by `timeout`, covering connect, redirects and
/// body download. Apps Script answers a POST with a 302 to a
/// `googleusercontent.com` URL carrying the result, so redirects are followed
/// with the client's default policy.
#[derive(Clone)]
pub struct HttpCollector {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpCollector {
    /// Builds a collector client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::ClientBuild`] if the TLS backend cannot be
    /// initialised.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TrackingError> {
        let client = Client::builder()
            .user_agent(concat!("redirect-tracker/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .build()
            .map_err(|e| TrackingError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ClickSink for HttpCollector {
    async fn deliver(&self, event: &ClickEvent) -> Result<CollectorStatus, TrackingError> {
        let exchange = async {
            let response = self
                .client
                .post(self.endpoint.clone())
                .json(event)
                .send()
                .await?
                .error_for_status()?;

            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(body)
        };

        let body = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) if e.is_timeout() => return Err(TrackingError::Timeout(self.timeout)),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(TrackingError::Timeout(self.timeout)),
        };

        let status = CollectorStatus::from_body(&body);
        debug!(status = %status, bytes = body.len(), "Collector replied");

        Ok(status)
    }
}
