use cms_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    registry::{RegistryState, TokenRegistry},
    resolver::PathResolver,
    storage::{AssetStoreState, FsAssetStore},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for initializing
/// all core components: Configuration, Logging, Storage, the token registry
/// (including the startup rescan), and the HTTP Server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Sets the default log level. It prioritizes the RUST_LOG environment variable,
    // falling back to sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cms_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    // The structured logging format is dynamically selected based on the APP_ENV.
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability during local debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON format output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Storage and Resolver Initialization
    // The filesystem store is rooted at the configured asset root; the resolver
    // probes it when walking the candidate chain.
    let store = Arc::new(FsAssetStore::new(&config.asset_root)) as AssetStoreState;
    let resolver = Arc::new(PathResolver::new(&config, store.clone()));

    // 5. Token Registry Initialization (startup rescan)
    // The registry is constructed here — explicit init, no static state — and
    // seeded by scanning the configured image roots once.
    let registry: RegistryState = Arc::new(TokenRegistry::new(
        Duration::from_secs(config.resource_token_ttl_secs),
        Duration::from_secs(config.session_token_ttl_secs),
    ));

    let seeded = cms_portal::rescan_image_tokens(&registry, store.as_ref(), &config);
    tracing::info!(seeded, "image token table initialized");

    // 6. Unified State Assembly
    let app_state = AppState {
        registry,
        resolver,
        store,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
