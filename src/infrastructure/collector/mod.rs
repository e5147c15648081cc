//! Delivery of click events to the external logging collector.
//!
//! Provides a [`ClickSink`] trait with one production implementation:
//! - [`HttpCollector`] - JSON POST to the configured web app endpoint

mod http_collector;
mod service;

pub use http_collector::HttpCollector;
pub use service::{ClickSink, CollectorStatus};

#[cfg(test)]
pub use service::MockClickSink;
