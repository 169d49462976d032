use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::config::AppConfig;

/// SessionId
///
/// The opaque browser-session identity the gateway binds tokens against. The
/// surrounding web stack's session mechanism is a plain cookie here: the
/// extractor reads the configured cookie when present and mints a fresh id
/// when absent. `fresh` tells handlers that establish session state to set
/// the cookie on their response; a fresh id by definition has no token
/// binding yet, so the serve-side gate rejects it until one is issued.
#[derive(Debug, Clone)]
pub struct SessionId {
    pub id: String,
    pub fresh: bool,
}

impl SessionId {
    /// set_cookie_value
    ///
    /// The Set-Cookie value that persists this session id in the browser.
    pub fn set_cookie_value(&self, config: &AppConfig) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            config.session_cookie, self.id
        )
    }
}

/// SessionId Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making SessionId usable as a
/// function argument in any gateway handler. Extraction never fails: a
/// request without the cookie simply gets a newly minted id, mirroring a
/// servlet-style container session that is created on first access.
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the cookie name).
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if let Some(id) = cookie_value(parts, &config.session_cookie) {
            return Ok(SessionId { id, fresh: false });
        }

        Ok(SessionId {
            id: Uuid::new_v4().simple().to_string(),
            fresh: true,
        })
    }
}

/// cookie_value
///
/// Finds `name` in the request's Cookie headers. Malformed pairs are skipped.
fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    for header_value in parts.headers.get_all(header::COOKIE) {
        let Ok(raw) = header_value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
