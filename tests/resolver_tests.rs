use cms_portal::config::AppConfig;
use cms_portal::resolver::PathResolver;
use cms_portal::storage::{AssetStoreState, FsAssetStore};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Writes an empty marker file, creating parent directories as needed.
fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"x").unwrap();
}

fn resolver_over(root: &TempDir, config: AppConfig) -> PathResolver {
    let store = Arc::new(FsAssetStore::new(root.path())) as AssetStoreState;
    PathResolver::new(&config, store)
}

#[test]
fn explicit_mapping_beats_every_other_candidate() {
    let root = TempDir::new().unwrap();
    // Present in a default search root as well — the mapping must still win.
    touch(root.path(), "static/images/logo.png");
    touch(root.path(), "static/images/brand/logo.png");

    let mut config = AppConfig::default();
    config
        .file_mappings
        .insert("logo.png".to_string(), "static/images/brand/".to_string());

    let resolver = resolver_over(&root, config);
    assert_eq!(resolver.resolve("logo.png"), "static/images/brand/logo.png");
}

#[test]
fn mapping_is_unconditional_even_when_the_target_is_missing() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "static/images/logo.png");

    let mut config = AppConfig::default();
    config
        .file_mappings
        .insert("logo.png".to_string(), "static/images/brand/".to_string());

    let resolver = resolver_over(&root, config);
    // Step 1 never probes; downstream callers check existence themselves.
    assert_eq!(resolver.resolve("logo.png"), "static/images/brand/logo.png");
}

#[test]
fn recent_uploads_prefer_the_external_folder() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "images/temp_20250801/banner.png");

    let resolver = resolver_over(&root, AppConfig::default());
    assert_eq!(
        resolver.resolve("temp_20250801/banner.png"),
        "images/temp_20250801/banner.png"
    );
}

#[test]
fn recent_uploads_fall_back_to_the_bundled_folder() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "static/images/temp_20250801/banner.png");

    let resolver = resolver_over(&root, AppConfig::default());
    assert_eq!(
        resolver.resolve("temp_20250801/banner.png"),
        "static/images/temp_20250801/banner.png"
    );
}

#[test]
fn default_roots_are_probed_in_listed_order() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "static/icons/arrow.png");
    touch(root.path(), "static/images/arrow.png");

    let mut config = AppConfig::default();
    config.default_paths = vec!["static/icons/".to_string(), "static/images/".to_string()];

    let resolver = resolver_over(&root, config);
    assert_eq!(resolver.resolve("arrow.png"), "static/icons/arrow.png");
}

#[test]
fn external_images_folder_is_probed_after_the_default_roots() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "images/photo.jpg");

    let resolver = resolver_over(&root, AppConfig::default());
    assert_eq!(resolver.resolve("photo.jpg"), "images/photo.jpg");
}

#[test]
fn unresolvable_names_get_the_bundled_fallback_path() {
    let root = TempDir::new().unwrap();

    let resolver = resolver_over(&root, AppConfig::default());
    // Never fails: the best-guess path is returned even though nothing exists there.
    assert_eq!(resolver.resolve("ghost.png"), "static/images/ghost.png");
}

#[test]
fn subfolder_names_resolve_through_the_default_roots() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "static/images/icons/logo.png");

    let resolver = resolver_over(&root, AppConfig::default());
    assert_eq!(
        resolver.resolve("icons/logo.png"),
        "static/images/icons/logo.png"
    );
}
