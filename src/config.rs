//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//! Handlers never read the environment; they receive what they need through
//! [`crate::state::AppState`].
//!
//! ## Example
//!
//! ```bash
//! export DEST_URL="https://oussamalayaidi.vercel.app"
//! export TRACKING_GAS_ENDPOINT="https://script.google.com/macros/s/<deployment>/exec"
//! ```
//!
//! ## Optional Variables
//!
//! - `DEST_URL` - Redirect target (default: [`DEFAULT_DESTINATION_URL`])
//! - `TRACKING_GAS_ENDPOINT` - Click collector URL; logging is disabled when unset
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `TRACKING_TIMEOUT_MS` - Collector request timeout (default: 5000)
//! - `CLICK_QUEUE_CAPACITY` - Click event buffer size (default: 10000, min: 100)
//! - `CLICK_WORKER_CONCURRENCY` - Parallel deliveries (default: 4)
//! - `SHUTDOWN_DRAIN_SECS` - Time allowed for pending deliveries at shutdown (default: 10)

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

use crate::domain::redirect::DEFAULT_DESTINATION_URL;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where every tracking link redirects to.
    pub destination_url: String,
    /// Collector endpoint; `None` disables click logging.
    pub tracking_endpoint: Option<String>,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// Upper bound for one collector exchange, in milliseconds.
    pub tracking_timeout_ms: u64,
    pub click_queue_capacity: usize,
    /// Maximum number of click deliveries in flight at once.
    pub click_worker_concurrency: usize,
    /// Grace period for the click worker after the listener stops.
    pub shutdown_drain_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination_url: DEFAULT_DESTINATION_URL.to_string(),
            tracking_endpoint: None,
            listen_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            tracking_timeout_ms: 5_000,
            click_queue_capacity: 10_000,
            click_worker_concurrency: 4,
            shutdown_drain_secs: 10,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Missing or empty `DEST_URL` falls back to the default destination;
    /// missing or empty `TRACKING_GAS_ENDPOINT` disables logging.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let destination_url = non_empty_var("DEST_URL").unwrap_or(defaults.destination_url);
        let tracking_endpoint = non_empty_var("TRACKING_GAS_ENDPOINT");

        let listen_addr = env::var("LISTEN").unwrap_or(defaults.listen_addr);
        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);
        let log_format = env::var("LOG_FORMAT").unwrap_or(defaults.log_format);

        let tracking_timeout_ms =
            parse_var("TRACKING_TIMEOUT_MS")?.unwrap_or(defaults.tracking_timeout_ms);
        let click_queue_capacity =
            parse_var("CLICK_QUEUE_CAPACITY")?.unwrap_or(defaults.click_queue_capacity);
        let click_worker_concurrency = parse_var("CLICK_WORKER_CONCURRENCY")?
            .unwrap_or(defaults.click_worker_concurrency);
        let shutdown_drain_secs =
            parse_var("SHUTDOWN_DRAIN_SECS")?.unwrap_or(defaults.shutdown_drain_secs);

        Ok(Self {
            destination_url,
            tracking_endpoint,
            listen_addr,
            log_level,
            log_format,
            tracking_timeout_ms,
            click_queue_capacity,
            click_worker_concurrency,
            shutdown_drain_secs,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DEST_URL` or `TRACKING_GAS_ENDPOINT` is not an absolute http(s) URL
    /// - `listen_addr` is not a socket address
    /// - `log_format` is not `text` or `json`
    /// - a numeric setting is out of range
    pub fn validate(&self) -> Result<()> {
        parse_http_url(&self.destination_url).context("DEST_URL is invalid")?;

        if let Some(endpoint) = &self.tracking_endpoint {
            parse_http_url(endpoint).context("TRACKING_GAS_ENDPOINT is invalid")?;
        }

        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if self.tracking_timeout_ms == 0 || self.tracking_timeout_ms > 60_000 {
            anyhow::bail!(
                "TRACKING_TIMEOUT_MS must be between 1 and 60000, got {}",
                self.tracking_timeout_ms
            );
        }

        if self.click_queue_capacity < 100 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY must be at least 100, got {}",
                self.click_queue_capacity
            );
        }

        if self.click_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.click_queue_capacity
            );
        }

        if self.click_worker_concurrency == 0 || self.click_worker_concurrency > 256 {
            anyhow::bail!(
                "CLICK_WORKER_CONCURRENCY must be between 1 and 256, got {}",
                self.click_worker_concurrency
            );
        }

        if self.shutdown_drain_secs > 300 {
            anyhow::bail!(
                "SHUTDOWN_DRAIN_SECS must be at most 300, got {}",
                self.shutdown_drain_secs
            );
        }

        Ok(())
    }

    /// Returns whether click logging is enabled.
    pub fn is_tracking_enabled(&self) -> bool {
        self.tracking_endpoint.is_some()
    }

    /// Parsed collector endpoint, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is set but not a valid http(s) URL.
    pub fn tracking_endpoint_url(&self) -> Result<Option<Url>> {
        self.tracking_endpoint
            .as_deref()
            .map(parse_http_url)
            .transpose()
    }

    pub fn tracking_timeout(&self) -> Duration {
        Duration::from_millis(self.tracking_timeout_ms)
    }

    pub fn shutdown_drain(&self) -> Duration {
        Duration::from_secs(self.shutdown_drain_secs)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Destination: {}", self.destination_url);

        if let Some(ref endpoint) = self.tracking_endpoint {
            tracing::info!(
                "  Collector: {} (timeout {}ms)",
                mask_endpoint(endpoint),
                self.tracking_timeout_ms
            );
        } else {
            tracing::info!("  Collector: disabled");
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Click queue capacity: {}", self.click_queue_capacity);
        tracing::info!("  Click worker concurrency: {}", self.click_worker_concurrency);
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(None),
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("'{}' is not a valid URL", raw))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("'{}' must use http or https", raw);
    }
    if url.host_str().is_none() {
        anyhow::bail!("'{}' has no host", raw);
    }

    Ok(url)
}

/// Masks the path and query of a collector endpoint for logging.
///
/// Apps Script deployment IDs live in the path and grant write access to the
/// sheet, so only scheme and host are shown:
/// - `https://script.google.com/macros/s/AKfy.../exec` → `https://script.google.com/***`
pub fn mask_endpoint(endpoint: &str) -> String {
    match Url::parse(endpoint) {
        Ok(url) => match url.host_str() {
            Some(host) => match url.port() {
                Some(port) => format!("{}://{}:{}/***", url.scheme(), host, port),
                None => format!("{}://{}/***", url.scheme(), host),
            },
            None => "***".to_string(),
        },
        Err(_) => "***".to_string(),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
