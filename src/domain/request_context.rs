//! Host-independent view of an inbound tracking request.

use axum::http::{HeaderMap, Uri, request::Parts};
use axum::extract::ConnectInfo;
use std::net::{IpAddr, SocketAddr};

/// Path reported when the request URI carries no path at all.
pub const DEFAULT_REQUEST_PATH: &str = "/api/r";

/// Typed accessors over the parts of a request the tracker reads.
///
/// Extraction rules (client IP, referrer, UTM) are written against this type
/// rather than against axum's request, so they can be exercised with plain
/// values in tests and reused by the admin CLI.
///
/// # Examples
///
/// ```ignore
/// let ctx = RequestContext::new(
///     &"/api/r?src=linkedin".parse().unwrap(),
///     HeaderMap::new(),
///     None,
/// );
/// assert_eq!(ctx.query("src"), Some("linkedin"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    headers: HeaderMap,
    query: Vec<(String, String)>,
    request_path: String,
    peer_addr: Option<SocketAddr>,
}

impl RequestContext {
    /// Builds a context from a URI, its headers and the transport peer.
    pub fn new(uri: &Uri, headers: HeaderMap, peer_addr: Option<SocketAddr>) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        let request_path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .filter(|pq| !pq.is_empty())
            .unwrap_or_else(|| DEFAULT_REQUEST_PATH.to_string());

        Self {
            headers,
            query,
            request_path,
            peer_addr,
        }
    }

    /// Builds a context from axum request parts.
    ///
    /// The peer address is taken from the [`ConnectInfo`] extension when the
    /// server was started with connect info; otherwise it is left empty.
    pub fn from_parts(parts: &Parts) -> Self {
        let peer_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Self::new(&parts.uri, parts.headers.clone(), peer_addr)
    }

    /// Returns a header value, treating missing, empty and non-UTF-8 values
    /// alike as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }

    /// Returns the first value of a query parameter, exactly as decoded.
    ///
    /// A parameter present with an empty value (`?src=`) yields `Some("")`.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Original path plus query string, as received.
    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    /// Transport-level peer address, if the server exposed one.
    pub fn peer_ip(&self) -> Option<IpAddr> {
        self.peer_addr.map(|addr| addr.ip())
    }
}
