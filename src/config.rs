use std::collections::HashMap;
use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring consistency across all threads and services
/// (Resolver, Registry, AssetStore). It is pulled into the application state via
/// FromRef, embodying the "immutable AppConfig" part of the Unified State Pattern.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls logging format selection.
    pub env: Env,
    // Base directory all store-relative paths are resolved against.
    pub asset_root: String,
    // Explicit filename -> directory overrides, consulted first by the resolver.
    pub file_mappings: HashMap<String, String>,
    // Ordered search roots probed after the overrides and the upload convention.
    pub default_paths: Vec<String>,
    // External images folder, outside the deployable artifact.
    pub external_images_dir: String,
    // Bundled static-assets images folder. Doubles as the unconditional
    // resolver fallback and the secondary probe for recent uploads.
    pub bundled_images_dir: String,
    // Roots walked by the startup scan and by POST /refresh.
    pub scan_dirs: Vec<String>,
    // Directory the stylesheet endpoints read from.
    pub css_dir: String,
    // Stylesheets processed by GET /css/processed, relative to css_dir.
    pub css_files: Vec<String>,
    // Validity window for per-resource tokens, in seconds.
    pub resource_token_ttl_secs: u64,
    // Validity window for session tokens, in seconds.
    pub session_token_ttl_secs: u64,
    // Name of the cookie carrying the opaque session id.
    pub session_cookie: String,
}

/// Env
///
/// Defines the runtime context, used to switch between human-readable log output
/// (local development) and structured JSON output (production aggregators).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows us to instantiate the configuration without needing to set environment
    /// variables for lightweight unit or integration testing state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            asset_root: ".".to_string(),
            file_mappings: HashMap::new(),
            default_paths: vec!["static/images/".to_string()],
            external_images_dir: "images/".to_string(),
            bundled_images_dir: "static/images/".to_string(),
            scan_dirs: vec!["static/images/".to_string()],
            css_dir: "static/style/".to_string(),
            css_files: vec![
                "main.css".to_string(),
                "common.css".to_string(),
                "reset.css".to_string(),
                "mobile.css".to_string(),
            ],
            resource_token_ttl_secs: 2 * 60 * 60,
            session_token_ttl_secs: 2 * 60 * 60,
            session_cookie: "PORTAL_SID".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at startup.
    /// Every setting has a working default so a bare process serves the bundled assets;
    /// deployments override individual values through environment variables (typically
    /// provided via `.env` in local development).
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let defaults = Self::default();

        Self {
            env,
            asset_root: env::var("ASSET_ROOT").unwrap_or(defaults.asset_root),
            file_mappings: env::var("IMAGE_FILE_MAPPINGS")
                .map(|raw| parse_mappings(&raw))
                .unwrap_or(defaults.file_mappings),
            default_paths: env::var("IMAGE_DEFAULT_PATHS")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.default_paths),
            external_images_dir: env::var("IMAGE_EXTERNAL_DIR")
                .unwrap_or(defaults.external_images_dir),
            bundled_images_dir: env::var("IMAGE_BUNDLED_DIR")
                .unwrap_or(defaults.bundled_images_dir),
            scan_dirs: env::var("IMAGE_SCAN_DIRS")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.scan_dirs),
            css_dir: env::var("CSS_DIR").unwrap_or(defaults.css_dir),
            css_files: env::var("CSS_FILES")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.css_files),
            resource_token_ttl_secs: env::var("RESOURCE_TOKEN_TTL_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.resource_token_ttl_secs),
            session_token_ttl_secs: env::var("SESSION_TOKEN_TTL_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.session_token_ttl_secs),
            session_cookie: env::var("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
        }
    }
}

/// parse_list
///
/// Parses a comma-separated environment value into an ordered list, trimming
/// whitespace and dropping empty segments. Order is preserved: for
/// `IMAGE_DEFAULT_PATHS` and `IMAGE_SCAN_DIRS` the listed order is contractual.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// parse_mappings
///
/// Parses a comma-separated `fileName=directory` environment value into the explicit
/// override table consulted first by the resolver. Segments without a `=` are ignored.
pub fn parse_mappings(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|segment| {
            let (name, dir) = segment.split_once('=')?;
            let (name, dir) = (name.trim(), dir.trim());
            if name.is_empty() || dir.is_empty() {
                return None;
            }
            Some((name.to_string(), dir.to_string()))
        })
        .collect()
}
