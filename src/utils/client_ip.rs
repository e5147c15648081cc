//! Best-effort client IP extraction.

use crate::domain::request_context::RequestContext;

/// Sentinel reported when no address can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Extracts the originating client address from a tracking request.
///
/// Resolution order:
///
/// 1. First comma-separated entry of `X-Forwarded-For`, trimmed
/// 2. `X-Real-IP`, trimmed
/// 3. Transport peer address
/// 4. `"unknown"`
///
/// An empty first `X-Forwarded-For` entry (e.g. `", 10.0.0.1"`) counts as absent.
///
/// The forwarded headers are client-controlled unless a trusted edge proxy
/// overwrites them. The value is recorded for analytics only and is never
/// used for access decisions.
///
/// # Examples
///
/// ```ignore
/// // X-Forwarded-For: 1.2.3.4, 5.6.7.8
/// assert_eq!(extract_client_ip(&ctx), "1.2.3.4");
/// ```
pub fn extract_client_ip(ctx: &RequestContext) -> String {
    if let Some(first) = ctx
        .header("x-forwarded-for")
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = ctx
        .header("x-real-ip")
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return real_ip.to_string();
    }

    ctx.peer_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}
