//! Application layer services.
//!
//! Coordinates domain operations for the HTTP handlers. The only service is
//! [`services::tracking_service::TrackingService`], which turns a request into
//! a queued click event without blocking the redirect.

pub mod services;
