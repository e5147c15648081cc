//! Application services orchestrating the request path.
//!
//! - [`TrackingService`] - non-blocking hand-off of click events to the worker

pub mod tracking_service;

pub use tracking_service::TrackingService;
