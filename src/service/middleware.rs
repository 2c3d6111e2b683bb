//! Request tracking middleware.
//!
//! Every request gets a trace id (taken from `X-Request-Id` or freshly
//! generated), a `request` span, and one access log line under the
//! `snippet_service::access` target. Paths are logged with snippet ids
//! collapsed to `:id` so log aggregation stays low-cardinality.
//!
//! [`with_security_headers`] adds a baseline set of hardening headers to
//! every response.

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
    Router,
};
use regex_lite::Regex;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, info_span, Instrument};

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request id that is trusted as-is.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Whether a client-supplied request id is safe to log and echo.
///
/// Accepts 1 to [`MAX_REQUEST_ID_LEN`] visible ASCII characters.
fn is_acceptable_request_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

/// Request logging middleware that adds a correlation id and timing.
///
/// The trace id is echoed back on the response.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| is_acceptable_request_id(s))
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let span = info_span!(
        "request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency_ms);

    info!(
        target: "snippet_service::access",
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = status,
        latency_ms = latency_ms,
        "request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Headers added to every response unless a handler already set them.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Wrap `router` so every response, fallback included, carries
/// [`SECURITY_HEADERS`].
pub fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

fn snippet_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[0-9a-fA-F]{24}\b").expect("static pattern compiles"))
}

/// Replace snippet ids in `path` with `:id`.
pub fn normalize_path(path: &str) -> String {
    snippet_id_pattern().replace_all(path, ":id").to_string()
}
