use axum::http::{HeaderMap, header};

use crate::registry::TokenRegistry;
use crate::session::SessionId;

/// Request Validator
///
/// The four-check gate in front of byte release. All checks must pass; any
/// failure rejects the request (fail closed), which the serve handler maps to
/// 403. This is a heuristic deterrent against casual direct linking and
/// hotlinking, not a cryptographic authorization boundary:
///
/// 1. the caller's session id holds a live (unexpired) session-token binding;
/// 2. a User-Agent header is present and non-blank;
/// 3. a Referer header is present and its value contains the request's host;
/// 4. an Accept header is present and admits an image type or a wildcard.
pub fn is_valid_request(headers: &HeaderMap, session: &SessionId, registry: &TokenRegistry) -> bool {
    // 1. Session-bound token, evaluated lazily at the moment of use.
    if !registry.has_live_session(&session.id) {
        return false;
    }

    // 2. User-Agent: browsers always send one.
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if user_agent.trim().is_empty() {
        return false;
    }

    // 3. Referer host must match the request's own host.
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok());
    match referer {
        Some(referer) if is_valid_referer(referer, headers) => {}
        _ => return false,
    }

    // 4. Accept must admit images.
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !accept.contains("image") && !accept.contains("*/*") {
        return false;
    }

    true
}

/// is_valid_referer
///
/// Anti-hotlinking heuristic: the Referer value must contain the request's
/// Host header value. A request without a Host header is rejected outright.
fn is_valid_referer(referer: &str, headers: &HeaderMap) -> bool {
    match headers.get(header::HOST).and_then(|value| value.to_str().ok()) {
        Some(host) if !host.is_empty() => referer.contains(host),
        _ => false,
    }
}
