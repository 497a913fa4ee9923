//! Request correlation ids.
//!
//! A reverse proxy may already have assigned an `x-request-id`; it is kept
//! when it is a short token of URL-safe characters. Anything else is
//! replaced with a fresh UUID v4 so forwarded headers cannot smuggle text
//! into log lines or Sentry tags.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest incoming id that is reused as is.
const MAX_FORWARDED_LEN: usize = 64;

/// Pick the id for this request: the forwarded one if acceptable, else new.
fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| is_acceptable(id))
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned)
}

fn is_acceptable(id: &str) -> bool {
    (1..=MAX_FORWARDED_LEN).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Tag the request with an id: recorded on the trace span and the Sentry
/// scope, echoed back in the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
