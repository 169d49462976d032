use crate::{
    AppState, css,
    models::{RefreshResponse, SecureUrlResponse, SessionTokenResponse},
    session::SessionId,
    storage, validator,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

// --- Handlers ---

/// serve_image
///
/// [Gateway Route] Releases the bytes behind a resource token.
///
/// Order of checks: request gate (403) -> token lookup (404) -> expiry.
/// An expired token whose file still resolves is self-healed exactly once:
/// the handler rotates the token and redirects; the client decides whether to
/// follow. An expired token whose file no longer resolves is gone (410).
/// Valid tokens stream the resolved file with caching and sniffing disabled.
/// Read failures surface as 404 — the underlying error and path stay private.
#[utoipa::path(
    get,
    path = "/api/secure-images/{token}",
    params(("token" = String, Path, description = "Opaque resource token")),
    responses(
        (status = 200, description = "Resource bytes, cache-disabled"),
        (status = 302, description = "Token expired; Location carries the replacement"),
        (status = 403, description = "Request gate failed"),
        (status = 404, description = "Unknown token or unreadable file"),
        (status = 410, description = "Expired token whose file no longer resolves")
    )
)]
pub async fn serve_image(
    State(state): State<AppState>,
    Path(token): Path<String>,
    session: SessionId,
    headers: HeaderMap,
) -> Response {
    // Gate first: an unknown caller learns nothing about token validity.
    if !validator::is_valid_request(&headers, &session, &state.registry) {
        tracing::debug!(%token, "request gate rejected image fetch");
        return StatusCode::FORBIDDEN.into_response();
    }

    let Some(file_name) = state.registry.file_name_for(&token) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if state.registry.is_expired(&token) {
        // Single corrective step: rotate and redirect when the file still
        // resolves, otherwise the resource is gone.
        let path = state.resolver.resolve(&file_name);
        if !state.store.exists(&path) {
            return StatusCode::GONE.into_response();
        }
        let new_token = state.registry.rotate(&file_name, &token);
        tracing::debug!(%file_name, "rotated expired resource token");
        let location = format!("{}/{}", css::SECURE_IMAGE_BASE, new_token);
        return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
    }

    let path = state.resolver.resolve(&file_name);
    let Some(bytes) = state.store.read(&path).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    (
        [
            (header::CONTENT_TYPE, storage::content_type_for(&file_name)),
            (
                header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate",
            ),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (header::X_FRAME_OPTIONS, "DENY"),
        ],
        bytes,
    )
        .into_response()
}

/// issue_session_token
///
/// [Gateway Route] Issues the session token a page requests on load.
/// Every call mints and stores a fresh token, superseding any previous
/// binding for the session — unlike resource tokens, which are reused.
#[utoipa::path(
    post,
    path = "/api/secure-images/session-token",
    responses((status = 200, description = "New session token", body = SessionTokenResponse))
)]
pub async fn issue_session_token(
    State(state): State<AppState>,
    session: SessionId,
) -> Response {
    let token = state.registry.force_new_session_token(&session.id);

    let body = SessionTokenResponse {
        session_token: token,
        expires_in: state.registry.session_ttl_ms(),
    };

    with_session_cookie(Json(body).into_response(), &session, &state)
}

/// get_mapping
///
/// [Gateway Route] Dumps the current binding-key -> secure-URL table.
/// Contents reflect the lazy-expiry policy: entries persist until a refresh
/// rebuilds the table, regardless of token age.
#[utoipa::path(
    get,
    path = "/api/secure-images/mapping",
    responses((status = 200, description = "Binding key to secure URL map"))
)]
pub async fn get_mapping(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    let mappings = state
        .registry
        .mapping()
        .into_iter()
        .map(|(key, token)| (key, format!("{}/{}", css::SECURE_IMAGE_BASE, token)))
        .collect();

    Json(mappings)
}

/// generate_token
///
/// [Gateway Route] Resolves a logical filename to a secure URL, issuing or
/// reusing the token bound to (sessionId, fileName). Within the validity
/// window repeated calls return the identical token. The first issuance for
/// a session also establishes the session-token binding, so a page that
/// starts with generate calls can fetch bytes without a separate
/// session-token round trip. Unresolvable filenames are 404.
#[utoipa::path(
    get,
    path = "/api/secure-images/generate/{fileName}",
    params(("fileName" = String, Path, description = "Logical image path, may contain folders")),
    responses(
        (status = 200, description = "Token issued or reused", body = SecureUrlResponse),
        (status = 404, description = "Filename does not resolve to an existing file")
    )
)]
pub async fn generate_token(
    State(state): State<AppState>,
    session: SessionId,
    Path(file_name): Path<String>,
) -> Response {
    let path = state.resolver.resolve(&file_name);
    if !state.store.exists(&path) {
        tracing::debug!(%file_name, "generate rejected: file unresolvable");
        return StatusCode::NOT_FOUND.into_response();
    }

    let binding_key = format!("{}:{}", session.id, file_name);
    let first_issue = state.registry.token_for(&binding_key).is_none();
    let token = state.registry.issue_or_reuse(&binding_key);
    if first_issue {
        state.registry.bind_session_token(&session.id, &token);
    }

    let body = SecureUrlResponse {
        secure_url: format!("{}/{}", css::SECURE_IMAGE_BASE, token),
        file_name,
        token,
    };

    with_session_cookie(Json(body).into_response(), &session, &state)
}

/// refresh_tokens
///
/// [Gateway Route] Clears the resource-token table and rebuilds it from a
/// rescan of the configured image roots. Tokens not rediscovered by the scan
/// (including every session-scoped binding) are dropped. Session tokens are
/// untouched. No authorization applies beyond the standard perimeter.
#[utoipa::path(
    post,
    path = "/api/secure-images/refresh",
    responses((status = 200, description = "Rescan summary", body = RefreshResponse))
)]
pub async fn refresh_tokens(State(state): State<AppState>) -> Json<RefreshResponse> {
    state.registry.clear_resource_tokens();
    let total = crate::rescan_image_tokens(&state.registry, state.store.as_ref(), &state.config);
    tracing::info!(total, "image token table rebuilt");

    Json(RefreshResponse {
        message: "Image tokens refreshed.".to_string(),
        total_images: total,
        tokens: state.registry.mapping(),
    })
}

/// secure_css
///
/// [Gateway Route] Serves a stylesheet with its background-image URLs
/// rewritten to gateway URLs, so embedded references also go through the
/// token layer. The named file is read from the configured style directory;
/// a missing source is 404.
#[utoipa::path(
    get,
    path = "/api/secure-images/css/{cssFileName}",
    params(("cssFileName" = String, Path, description = "Stylesheet name under the style directory")),
    responses(
        (status = 200, description = "Rewritten stylesheet"),
        (status = 404, description = "Stylesheet not found")
    )
)]
pub async fn secure_css(
    State(state): State<AppState>,
    Path(css_file_name): Path<String>,
) -> Response {
    let path = css::css_source_path(&state.config.css_dir, &css_file_name);
    let Some(bytes) = state.store.read(&path).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let rewritten =
        css::rewrite_stylesheet(&String::from_utf8_lossy(&bytes), &state.registry.mapping());

    (
        [
            (header::CONTENT_TYPE, "text/css"),
            (
                header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate",
            ),
        ],
        rewritten,
    )
        .into_response()
}

/// all_processed_css
///
/// [Gateway Route] Rewrites every configured stylesheet in one call and
/// returns a source-path -> rewritten-text map. Missing sources are skipped
/// rather than failing the batch.
#[utoipa::path(
    get,
    path = "/api/secure-images/css/processed",
    responses((status = 200, description = "Source path to rewritten stylesheet map"))
)]
pub async fn all_processed_css(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    let tokens = state.registry.mapping();
    let mut processed = HashMap::new();

    for name in &state.config.css_files {
        let path = css::css_source_path(&state.config.css_dir, name);
        if let Some(bytes) = state.store.read(&path).await {
            processed.insert(
                path,
                css::rewrite_stylesheet(&String::from_utf8_lossy(&bytes), &tokens),
            );
        }
    }

    Json(processed)
}

/// with_session_cookie
///
/// Appends the session cookie to responses from endpoints that establish
/// session state, but only when the extractor had to mint a fresh id.
fn with_session_cookie(mut response: Response, session: &SessionId, state: &AppState) -> Response {
    if session.fresh {
        if let Ok(value) = HeaderValue::from_str(&session.set_cookie_value(&state.config)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
