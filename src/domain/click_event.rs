//! Click event model shipped to the logging collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::request_context::RequestContext;
use crate::utils::client_ip::extract_client_ip;

/// Default `src` tag when the query string carries none.
pub const UNKNOWN_SOURCE: &str = "unknown";
/// Referrer reported when neither `Referer` nor `Referrer` is sent.
pub const DIRECT_REFERRER: &str = "direct";
/// User agent reported when the header is missing.
pub const UNKNOWN_USER_AGENT: &str = "unknown";

/// One inbound redirect request, as reported to the collector.
///
/// Serializes to a flat JSON object with a fixed set of 18 keys. Absent
/// values are sent as `""` (or the documented sentinels), never `null`,
/// because the collector appends rows to a fixed-column sheet.
///
/// # Usage Flow
///
/// 1. Captured in the redirect handler with [`ClickEvent::capture`]
/// 2. Handed to the background queue (non-blocking)
/// 3. Delivered by [`crate::domain::click_worker::run_click_worker`]
///
/// # Wire Format
///
/// ```json
/// {
///   "timestamp": "2025-03-01T09:30:00.123Z",
///   "src": "linkedin",
///   "request_path": "/api/r?src=linkedin",
///   "referrer": "direct",
///   "ip": "1.2.3.4",
///   "user_agent": "Mozilla/5.0",
///   "accept_language": "fr-FR,fr;q=0.9",
///   "country": "FR", "region": "IDF", "city": "Paris",
///   "latitude": "48.85", "longitude": "2.35", "timezone": "Europe/Paris",
///   "utm_source": "", "utm_medium": "", "utm_campaign": "",
///   "client_hint_mobile": "?0", "client_hint_platform": "\"Windows\""
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "src")]
    pub source: String,
    pub request_path: String,
    pub referrer: String,
    #[serde(rename = "ip")]
    pub client_ip: String,
    pub user_agent: String,
    pub accept_language: String,
    #[serde(flatten)]
    pub geo: GeoInfo,
    #[serde(flatten)]
    pub utm: UtmParams,
    #[serde(flatten)]
    pub client_hints: ClientHints,
}

/// Location headers injected by the edge platform (`x-vercel-ip-*`).
///
/// Forwarded verbatim, without decoding or validation. All fields are empty
/// when the request did not traverse that infrastructure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub country: String,
    pub region: String,
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub timezone: String,
}

/// Campaign attribution query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(rename = "utm_source")]
    pub source: String,
    #[serde(rename = "utm_medium")]
    pub medium: String,
    #[serde(rename = "utm_campaign")]
    pub campaign: String,
}

/// Browser client hints (`Sec-CH-UA-*`), raw header values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHints {
    #[serde(rename = "client_hint_mobile")]
    pub is_mobile: String,
    #[serde(rename = "client_hint_platform")]
    pub platform: String,
}

impl GeoInfo {
    fn from_headers(ctx: &RequestContext) -> Self {
        let read = |name: &str| ctx.header(name).unwrap_or_default().to_string();
        Self {
            country: read("x-vercel-ip-country"),
            region: read("x-vercel-ip-country-region"),
            city: read("x-vercel-ip-city"),
            latitude: read("x-vercel-ip-latitude"),
            longitude: read("x-vercel-ip-longitude"),
            timezone: read("x-vercel-ip-timezone"),
        }
    }
}

impl UtmParams {
    fn from_query(ctx: &RequestContext) -> Self {
        let read = |name: &str| ctx.query(name).unwrap_or_default().to_string();
        Self {
            source: read("utm_source"),
            medium: read("utm_medium"),
            campaign: read("utm_campaign"),
        }
    }
}

impl ClientHints {
    fn from_headers(ctx: &RequestContext) -> Self {
        Self {
            is_mobile: ctx.header("sec-ch-ua-mobile").unwrap_or_default().to_string(),
            platform: ctx
                .header("sec-ch-ua-platform")
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl ClickEvent {
    /// Builds a click event from a request, stamped with `now`.
    ///
    /// Pure function of its inputs: two captures of the same request differ
    /// only by timestamp. Deduplication is left to the collector.
    pub fn capture(ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        let referrer = ctx
            .header("referer")
            .or_else(|| ctx.header("referrer"))
            .unwrap_or(DIRECT_REFERRER)
            .to_string();

        Self {
            timestamp: now,
            source: ctx.query("src").unwrap_or(UNKNOWN_SOURCE).to_string(),
            request_path: ctx.request_path().to_string(),
            referrer,
            client_ip: extract_client_ip(ctx),
            user_agent: ctx
                .header("user-agent")
                .unwrap_or(UNKNOWN_USER_AGENT)
                .to_string(),
            accept_language: ctx.header("accept-language").unwrap_or_default().to_string(),
            geo: GeoInfo::from_headers(ctx),
            utm: UtmParams::from_query(ctx),
            client_hints: ClientHints::from_headers(ctx),
        }
    }

    /// Builds a click event stamped with the current time.
    pub fn capture_now(ctx: &RequestContext) -> Self {
        Self::capture(ctx, Utc::now())
    }
}

/// ISO-8601 UTC with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};
    use chrono::TimeZone;
    use serde_json::Value;

    const PAYLOAD_KEYS: [&str; 18] = [
        "timestamp",
        "src",
        "request_path",
        "referrer",
        "ip",
        "user_agent",
        "accept_language",
        "country",
        "region",
        "city",
        "latitude",
        "longitude",
        "timezone",
        "utm_source",
        "utm_medium",
        "utm_campaign",
        "client_hint_mobile",
        "client_hint_platform",
    ];

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
            + chrono::Duration::milliseconds(123)
    }

    fn ctx(uri: &str, headers: &[(&'static str, &'static str)]) -> RequestContext {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(value));
        }
        RequestContext::new(&uri.parse().unwrap(), map, None)
    }

    #[test]
    fn test_capture_src_and_partial_utm() {
        let event = ClickEvent::capture(
            &ctx("/api/r?src=linkedin&utm_source=email", &[]),
            fixed_now(),
        );

        assert_eq!(event.source, "linkedin");
        assert_eq!(event.utm.source, "email");
        assert_eq!(event.utm.medium, "");
        assert_eq!(event.utm.campaign, "");
    }

    #[test]
    fn test_capture_defaults_for_bare_request() {
        let event = ClickEvent::capture(&ctx("/api/r", &[]), fixed_now());

        assert_eq!(event.source, "unknown");
        assert_eq!(event.referrer, "direct");
        assert_eq!(event.user_agent, "unknown");
        assert_eq!(event.client_ip, "unknown");
        assert_eq!(event.accept_language, "");
        assert_eq!(event.request_path, "/api/r");
        assert_eq!(event.geo, GeoInfo::default());
        assert_eq!(event.client_hints, ClientHints::default());
    }

    #[test]
    fn test_capture_empty_src_is_kept() {
        let event = ClickEvent::capture(&ctx("/api/r?src=", &[]), fixed_now());
        assert_eq!(event.source, "");
    }

    #[test]
    fn test_referer_preferred_over_referrer() {
        let event = ClickEvent::capture(
            &ctx(
                "/api/r",
                &[
                    ("referer", "https://www.linkedin.com/"),
                    ("referrer", "https://other.example/"),
                ],
            ),
            fixed_now(),
        );
        assert_eq!(event.referrer, "https://www.linkedin.com/");
    }

    #[test]
    fn test_referrer_spelling_fallback() {
        let event = ClickEvent::capture(
            &ctx("/api/r", &[("referrer", "https://other.example/")]),
            fixed_now(),
        );
        assert_eq!(event.referrer, "https://other.example/");
    }

    #[test]
    fn test_capture_geo_and_client_hints() {
        let event = ClickEvent::capture(
            &ctx(
                "/api/r?src=apec",
                &[
                    ("x-vercel-ip-country", "FR"),
                    ("x-vercel-ip-country-region", "IDF"),
                    ("x-vercel-ip-city", "Paris"),
                    ("x-vercel-ip-latitude", "48.8566"),
                    ("x-vercel-ip-longitude", "2.3522"),
                    ("x-vercel-ip-timezone", "Europe/Paris"),
                    ("sec-ch-ua-mobile", "?1"),
                    ("sec-ch-ua-platform", "\"Android\""),
                    ("accept-language", "fr-FR,fr;q=0.9"),
                ],
            ),
            fixed_now(),
        );

        assert_eq!(event.geo.country, "FR");
        assert_eq!(event.geo.region, "IDF");
        assert_eq!(event.geo.city, "Paris");
        assert_eq!(event.geo.latitude, "48.8566");
        assert_eq!(event.geo.longitude, "2.3522");
        assert_eq!(event.geo.timezone, "Europe/Paris");
        assert_eq!(event.client_hints.is_mobile, "?1");
        assert_eq!(event.client_hints.platform, "\"Android\"");
        assert_eq!(event.accept_language, "fr-FR,fr;q=0.9");
    }

    #[test]
    fn test_geo_values_forwarded_verbatim() {
        let event = ClickEvent::capture(
            &ctx("/api/r", &[("x-vercel-ip-city", "S%C3%A3o%20Paulo")]),
            fixed_now(),
        );
        assert_eq!(event.geo.city, "S%C3%A3o%20Paulo");
    }

    #[test]
    fn test_serialized_payload_has_fixed_shape() {
        let event = ClickEvent::capture(&ctx("/api/r", &[]), fixed_now());
        let json = serde_json::to_value(&event).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), PAYLOAD_KEYS.len());
        for key in PAYLOAD_KEYS {
            let value = object.get(key).unwrap_or_else(|| panic!("missing key {key}"));
            assert!(value.is_string(), "{key} must be a string, got {value}");
        }
    }

    #[test]
    fn test_timestamp_serialized_with_millis() {
        let event = ClickEvent::capture(&ctx("/api/r", &[]), fixed_now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["timestamp"], Value::from("2025-03-01T09:30:00.123Z"));
    }

    #[test]
    fn test_payload_parses_back() {
        let event = ClickEvent::capture(
            &ctx("/api/r?src=github&utm_campaign=launch", &[("x-real-ip", "9.9.9.9")]),
            fixed_now(),
        );
        let body = serde_json::to_string(&event).unwrap();
        let parsed: ClickEvent = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_two_captures_are_independent() {
        let request = ctx("/api/r?src=linkedin", &[("x-forwarded-for", "1.2.3.4")]);
        let first = ClickEvent::capture(&request, fixed_now());
        let second = ClickEvent::capture(&request, fixed_now() + chrono::Duration::seconds(1));

        assert_ne!(first.timestamp, second.timestamp);
        assert_eq!(first.source, second.source);
        assert_eq!(first.client_ip, second.client_ip);
    }
}
