//! Infrastructure layer: integrations with external systems.
//!
//! - [`collector`] - Delivery of click events to the logging collector

pub mod collector;
