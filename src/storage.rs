use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use walkdir::WalkDir;

/// Recognized image file extensions. Shared by the rescan walk, the refresh
/// endpoint, and the mock store's listing logic.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp"];

/// is_image_file
///
/// Case-insensitive extension check against `IMAGE_EXTENSIONS`.
pub fn is_image_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// content_type_for
///
/// Maps a filename's extension to the Content-Type served with its bytes.
/// Unknown extensions fall back to the generic binary type.
pub fn content_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".svg") {
        "image/svg+xml"
    } else if lower.ends_with(".ico") {
        "image/x-icon"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

/// sanitize_path
///
/// Utility function to prevent path traversal by removing directory
/// navigation components (e.g., `..`, `.`) from a caller-provided path.
pub fn sanitize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

// 1. AssetStore Contract
/// AssetStore
///
/// Defines the abstract contract for the asset storage layer: given a resolved
/// path descriptor, answer existence probes, return bytes, or enumerate image
/// files. This trait is the single seam between the resolver/handlers and the
/// heterogeneous storage locations (bundled static assets vs. external
/// folders), and it allows swapping the real filesystem store for the
/// in-memory Mock (MockAssetStore) during testing.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Returns true when `path` names a regular file in the store.
    /// Probe failures count as absence; this must never panic.
    fn exists(&self, path: &str) -> bool;

    /// Reads the full byte content of `path`. Absence and I/O failures both
    /// surface as `None`; callers translate that to not-found without ever
    /// exposing the underlying path or error.
    async fn read(&self, path: &str) -> Option<Vec<u8>>;

    /// Lists image files under `dir`, as paths relative to `dir` with
    /// forward-slash separators. Non-image files are skipped.
    fn list_images(&self, dir: &str) -> Vec<String>;
}

// 2. The Real Implementation (local filesystem)
/// FsAssetStore
///
/// The concrete implementation over the local filesystem, rooted at the
/// configured asset root. Both the bundled static-assets tree and the external
/// uploads folders live under this root; the path descriptor's prefix
/// (`static/...` vs `images/...`) selects between them.
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    /// new
    ///
    /// Constructs the store over `root`. The directory does not have to exist
    /// yet; probes against a missing tree simply report absence.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    fn exists(&self, path: &str) -> bool {
        self.full_path(path).is_file()
    }

    /// read
    ///
    /// Reads run synchronously on the handler task; image assets are small.
    async fn read(&self, path: &str) -> Option<Vec<u8>> {
        match std::fs::read(self.full_path(path)) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!(path, error = %e, "asset read failed");
                None
            }
        }
    }

    fn list_images(&self, dir: &str) -> Vec<String> {
        let base = self.full_path(dir);
        if !base.is_dir() {
            return Vec::new();
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&base).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !is_image_file(&name) {
                continue;
            }
            if let Some(rel) = relative_to(entry.path(), &base) {
                found.push(rel);
            }
        }
        found.sort();
        found
    }
}

/// relative_to
///
/// Renders `path` relative to `base` with forward-slash separators, so scan
/// keys look the same on every platform.
fn relative_to(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let segments: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join("/"))
}

// 3. The Mock Implementation (For Tests)
/// MockAssetStore
///
/// An in-memory implementation of `AssetStore` used exclusively for unit and
/// integration testing. Files are plain `path -> bytes` entries; the interior
/// Mutex lets tests add and remove files mid-scenario (e.g., to exercise the
/// expired-token-with-missing-file path) through a shared handle.
#[derive(Clone, Default)]
pub struct MockAssetStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file entry.
    pub fn insert(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.into());
    }

    /// Removes a file entry, simulating an asset disappearing from disk.
    pub fn remove(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    fn exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    async fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn list_images(&self, dir: &str) -> Vec<String> {
        let files = self.files.lock().unwrap();
        let mut found: Vec<String> = files
            .keys()
            .filter_map(|path| path.strip_prefix(dir))
            .filter(|rel| is_image_file(rel))
            .map(str::to_string)
            .collect();
        found.sort();
        found
    }
}

/// AssetStoreState
///
/// The concrete type used to share the asset store access across the application state.
pub type AssetStoreState = Arc<dyn AssetStore>;
