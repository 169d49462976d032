use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core gateway services and components.
pub mod config;
pub mod css;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod storage;
pub mod validator;

// Module for routing segregation (public operational vs. gateway surface).
pub mod routes;
use routes::{gateway, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use registry::{RegistryState, TokenRegistry};
pub use resolver::PathResolver;
pub use storage::{AssetStore, AssetStoreState, FsAssetStore, MockAssetStore};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the
/// gateway surface. It aggregates all API paths and data schemas that have been
/// decorated with the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::serve_image,
        handlers::issue_session_token,
        handlers::get_mapping,
        handlers::generate_token,
        handlers::refresh_tokens,
        handlers::secure_css,
        handlers::all_processed_css,
    ),
    components(
        schemas(
            models::SessionTokenResponse,
            models::SecureUrlResponse,
            models::RefreshResponse,
        )
    ),
    tags(
        (name = "secure-images", description = "Token-mediated secure image gateway")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe
/// container holding all essential gateway services and configuration, shared
/// across all incoming requests. The token tables live here, constructed by
/// the composition root rather than as statics, with no teardown beyond
/// process exit; token state does not survive a restart.
#[derive(Clone)]
pub struct AppState {
    /// Token Registry: the concurrent binding/session token tables.
    pub registry: RegistryState,
    /// Path Resolver: logical filename -> best-guess storage location.
    pub resolver: Arc<PathResolver>,
    /// Asset Store: resolved path descriptor -> bytes or not-found.
    pub store: AssetStoreState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow extractors and handlers to selectively pull
// components from the shared AppState.

impl FromRef<AppState> for RegistryState {
    fn from_ref(app_state: &AppState) -> RegistryState {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for AssetStoreState {
    fn from_ref(app_state: &AppState) -> AssetStoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// rescan_image_tokens
///
/// Walks the configured scan roots and registers a resource token for every
/// discovered image file, keyed by its path relative to the scan root. Called
/// once at startup (the explicit init of the token tables) and by the refresh
/// endpoint after a clear. Returns the number of live bindings afterwards.
pub fn rescan_image_tokens(
    registry: &TokenRegistry,
    store: &dyn AssetStore,
    config: &AppConfig,
) -> usize {
    for dir in &config.scan_dirs {
        for relative_path in store.list_images(dir) {
            registry.issue_or_reuse(&relative_path);
        }
    }
    registry.len()
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Operational routes (health probe).
        .merge(public::public_routes())
        // The secure-image gateway surface.
        .nest("/api/secure-images", gateway::gateway_routes())
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in a
                // tracing span correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: returns the x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI, so every log
/// line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
