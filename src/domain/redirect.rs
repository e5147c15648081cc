//! Redirect decision for tracking links.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Destination used when `DEST_URL` is not configured.
pub const DEFAULT_DESTINATION_URL: &str = "https://oussamalayaidi.vercel.app";

/// Cache directives forbidding any caching of the redirect.
///
/// Every click must reach the tracker, so neither browsers nor intermediate
/// proxies may replay a stored 302.
pub const NO_CACHE_DIRECTIVES: &str = "no-cache, no-store, must-revalidate";

/// Where a tracking request is sent.
///
/// Computed once per request from configuration. The destination does not
/// depend on the tracking source or any request content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    destination: String,
}

impl RedirectDecision {
    /// Resolves the destination, falling back to [`DEFAULT_DESTINATION_URL`]
    /// when none (or an empty one) is configured.
    pub fn resolve(configured: Option<&str>) -> Self {
        let destination = configured
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_DESTINATION_URL)
            .to_string();

        Self { destination }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl IntoResponse for RedirectDecision {
    /// `302 Found` with `Location` and no-cache headers, empty body.
    ///
    /// axum's `Redirect` only offers 303/307/308, so the response is built
    /// by hand. A destination that is not a valid header value degrades to
    /// the default destination rather than failing the request.
    fn into_response(self) -> Response {
        let location = HeaderValue::from_str(&self.destination)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_DESTINATION_URL));

        (
            StatusCode::FOUND,
            [
                (header::LOCATION, location),
                (
                    header::CACHE_CONTROL,
                    HeaderValue::from_static(NO_CACHE_DIRECTIVES),
                ),
            ],
        )
            .into_response()
    }
}
