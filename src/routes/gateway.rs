use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Gateway Router Module
///
/// The token-mediated secure-image surface, nested at `/api/secure-images`.
/// The routes compose the resolver, registry, validator and rewriter. Access
/// control for byte release is enforced inside the serve handler (the
/// four-check request gate), not by a router layer; the remaining endpoints
/// are reachable from the standard perimeter.
pub fn gateway_routes() -> Router<AppState> {
    Router::new()
        // POST /session-token
        // Issues (and always rotates) the session token a page requests on load.
        .route("/session-token", post(handlers::issue_session_token))
        // GET /mapping
        // Dumps the current binding-key -> secure-URL table.
        .route("/mapping", get(handlers::get_mapping))
        // GET /generate/{fileName}
        // Resolves a logical filename (folders allowed, hence the wildcard)
        // to an issued-or-reused token and its secure URL.
        .route("/generate/{*file_name}", get(handlers::generate_token))
        // POST /refresh
        // Clears the resource-token table and rebuilds it from a directory rescan.
        .route("/refresh", post(handlers::refresh_tokens))
        // GET /css/processed
        // Batch variant: every configured stylesheet, rewritten. Registered
        // before the capture below so the literal segment wins the match.
        .route("/css/processed", get(handlers::all_processed_css))
        // GET /css/{cssFileName}
        // One stylesheet, background-image URLs rewritten to gateway URLs.
        .route("/css/{css_file_name}", get(handlers::secure_css))
        // GET /{token}
        // Byte release by token: gate, expiry self-healing, cache-disabled stream.
        .route("/{token}", get(handlers::serve_image))
}
