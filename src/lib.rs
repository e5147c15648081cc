//! # Redirect Tracker
//!
//! Tracking-link redirector built with Axum: every request to `/api/r` is
//! answered with an immediate `302 Found` to a fixed destination, and a
//! structured click event is shipped best-effort to an external collector.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Click events, request context, redirect decision, delivery worker
//! - **Application Layer** ([`application`]) - Non-blocking hand-off of click events
//! - **Infrastructure Layer** ([`infrastructure`]) - HTTP collector client
//! - **API Layer** ([`api`]) - Handlers, DTOs and middleware
//!
//! ## Guarantees
//!
//! - The redirect never waits on the collector and never fails
//! - One delivery attempt per click, bounded by a timeout, no retries
//! - Missing values are sent as empty strings; the payload shape is fixed
//!
//! ## Quick Start
//!
//! ```bash
//! export DEST_URL="https://oussamalayaidi.vercel.app"
//! export TRACKING_GAS_ENDPOINT="https://script.google.com/macros/s/<deployment>/exec"
//!
//! cargo run
//! curl -i "http://localhost:3000/api/r?src=linkedin&utm_source=email"
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::TrackingError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::TrackingService;
    pub use crate::domain::click_event::{ClickEvent, ClientHints, GeoInfo, UtmParams};
    pub use crate::domain::redirect::RedirectDecision;
    pub use crate::domain::request_context::RequestContext;
    pub use crate::error::TrackingError;
    pub use crate::infrastructure::collector::{ClickSink, CollectorStatus, HttpCollector};
    pub use crate::state::AppState;
}
