use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// TokenRegistry
///
/// Process-wide mutable token state, owned by the composition root and shared
/// across every request task. Three tables:
///
/// - binding key -> token, where a binding key is either a bare relative file
///   path (registered by the rescan) or `sessionId:fileName` (registered by
///   the per-session generate endpoint);
/// - token -> issue timestamp (epoch millis), for lazy expiry checks;
/// - session id -> (session token, issue timestamp).
///
/// All tables are concurrency-safe maps; issuance for a key is an atomic
/// check-then-insert so concurrent callers observe the same token. Expiry is
/// lazy: nothing sweeps stale entries, and the resource tables only shrink on
/// an explicit clear. Session bindings are never cleared at all, so the
/// tables grow with distinct (session, filename) pairs over the process
/// lifetime. None of this state survives a restart.
pub struct TokenRegistry {
    tokens: DashMap<String, String>,
    issued_at: DashMap<String, i64>,
    session_tokens: DashMap<String, (String, i64)>,
    resource_ttl_ms: i64,
    session_ttl_ms: i64,
}

impl TokenRegistry {
    /// new
    ///
    /// Builds an empty registry with the two validity windows. Both default to
    /// two hours in configuration; tests shrink them to exercise expiry.
    pub fn new(resource_ttl: Duration, session_ttl: Duration) -> Self {
        Self {
            tokens: DashMap::new(),
            issued_at: DashMap::new(),
            session_tokens: DashMap::new(),
            resource_ttl_ms: resource_ttl.as_millis() as i64,
            session_ttl_ms: session_ttl.as_millis() as i64,
        }
    }

    /// The session TTL in milliseconds, as reported by the session-token endpoint.
    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl_ms
    }

    /// issue_or_reuse
    ///
    /// Idempotent token issuance: returns the live token already bound to
    /// `binding_key`, or mints and registers a fresh one. The entry API makes
    /// the check-then-insert atomic per key, so two concurrent requests for
    /// the same key cannot mint two different tokens.
    pub fn issue_or_reuse(&self, binding_key: &str) -> String {
        self.tokens
            .entry(binding_key.to_string())
            .or_insert_with(|| {
                let token = mint_token();
                self.issued_at.insert(token.clone(), now_millis());
                token
            })
            .value()
            .clone()
    }

    /// token_for
    ///
    /// The token currently bound to `binding_key`, if any.
    pub fn token_for(&self, binding_key: &str) -> Option<String> {
        self.tokens.get(binding_key).map(|entry| entry.value().clone())
    }

    /// file_name_for
    ///
    /// Reverse lookup: the filename a token was bound against. Session-scoped
    /// keys (`sessionId:fileName`) are stripped to the bare filename.
    pub fn file_name_for(&self, token: &str) -> Option<String> {
        self.tokens.iter().find_map(|entry| {
            if entry.value().as_str() != token {
                return None;
            }
            let key = entry.key();
            match key.split_once(':') {
                Some((_, file_name)) => Some(file_name.to_string()),
                None => Some(key.clone()),
            }
        })
    }

    /// is_expired
    ///
    /// True once `now - issue > ttl`. A token with no recorded timestamp is
    /// treated as expired (fail closed).
    pub fn is_expired(&self, token: &str) -> bool {
        match self.issued_at.get(token) {
            Some(issued) => now_millis() - *issued > self.resource_ttl_ms,
            None => true,
        }
    }

    /// rotate
    ///
    /// Replaces an expired token: discards the old token's timestamp and every
    /// binding still holding it, then mints a fresh token registered under the
    /// bare `file_name`. Callers decide beforehand whether the backing file
    /// still resolves; when it does not, the resource is reported gone instead.
    pub fn rotate(&self, file_name: &str, old_token: &str) -> String {
        self.issued_at.remove(old_token);
        self.tokens.retain(|_, token| token.as_str() != old_token);

        let token = mint_token();
        self.issued_at.insert(token.clone(), now_millis());
        self.tokens.insert(file_name.to_string(), token.clone());
        token
    }

    /// has_live_session
    ///
    /// True when the session id holds an unexpired session-token binding.
    pub fn has_live_session(&self, session_id: &str) -> bool {
        match self.session_tokens.get(session_id) {
            Some(entry) => now_millis() - entry.value().1 <= self.session_ttl_ms,
            None => false,
        }
    }

    /// force_new_session_token
    ///
    /// Always mints a fresh session token and overwrites any existing binding
    /// for the session id. Non-idempotent, unlike resource-token issuance.
    pub fn force_new_session_token(&self, session_id: &str) -> String {
        let token = mint_token();
        self.session_tokens
            .insert(session_id.to_string(), (token.clone(), now_millis()));
        token
    }

    /// bind_session_token
    ///
    /// Stores an existing token value as the session's binding. The generate
    /// endpoint uses this on first issuance so a fresh session that asked for
    /// a secure URL can immediately pass the serve-side gate.
    pub fn bind_session_token(&self, session_id: &str, token: &str) {
        self.session_tokens
            .insert(session_id.to_string(), (token.to_string(), now_millis()));
    }

    /// clear_resource_tokens
    ///
    /// Empties the resource-token tables (bindings and timestamps). Session
    /// bindings are left untouched. Used by the bulk refresh.
    pub fn clear_resource_tokens(&self) {
        self.tokens.clear();
        self.issued_at.clear();
    }

    /// mapping
    ///
    /// Snapshot of the binding-key -> token table. Iteration order of the
    /// snapshot is unspecified, which the stylesheet rewriter inherits.
    pub fn mapping(&self) -> HashMap<String, String> {
        self.tokens
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of live resource-token bindings.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// mint_token
///
/// Opaque random identifier: UUIDv4 in simple format, 32 hex characters.
fn mint_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// RegistryState
///
/// The concrete type used to share the token registry across the application state.
pub type RegistryState = Arc<TokenRegistry>;
