//! Utility functions for request handling.
//!
//! - [`client_ip`] - Best-effort client IP extraction from proxy headers

pub mod client_ip;
