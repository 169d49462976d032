use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Gateway Wire Schemas ---
// Field names are camelCase on the wire; the site frontend consumes the
// exported TypeScript bindings.

/// SessionTokenResponse
///
/// Body of POST /api/secure-images/session-token. Every call rotates the
/// binding, so the returned token supersedes any previous one for the session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenResponse {
    /// The freshly minted session token.
    pub session_token: String,
    /// Validity window in milliseconds.
    pub expires_in: i64,
}

/// SecureUrlResponse
///
/// Body of GET /api/secure-images/generate/{fileName}: the logical filename,
/// its (possibly reused) token, and the gateway URL the browser fetches.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SecureUrlResponse {
    pub file_name: String,
    pub token: String,
    pub secure_url: String,
}

/// RefreshResponse
///
/// Body of POST /api/secure-images/refresh: summary of the rescan that just
/// replaced the resource-token table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub total_images: usize,
    /// The rebuilt binding-key -> token table.
    pub tokens: HashMap<String, String>,
}
