use std::collections::HashMap;

use crate::config::AppConfig;
use crate::storage::AssetStoreState;

/// PathResolver
///
/// Resolves a logical image filename to its best-guess storage location. The
/// folder layout behind the gateway is not fixed (bundled assets, externally
/// uploaded files, per-file overrides), so resolution walks an ordered chain
/// of candidates and returns the first hit.
///
/// Contract: `resolve` never fails and always returns *some* path string —
/// the final fallback is returned even when nothing exists there. Callers
/// that need the bytes must check existence themselves.
pub struct PathResolver {
    // Explicit filename -> directory overrides. Matches win unconditionally.
    file_mappings: HashMap<String, String>,
    // Ordered search roots, probed after the overrides and upload convention.
    default_paths: Vec<String>,
    external_images_dir: String,
    bundled_images_dir: String,
    store: AssetStoreState,
}

impl PathResolver {
    /// new
    ///
    /// Builds the resolver from the loaded configuration and the shared asset
    /// store (used only for existence probes).
    pub fn new(config: &AppConfig, store: AssetStoreState) -> Self {
        Self {
            file_mappings: config.file_mappings.clone(),
            default_paths: config.default_paths.clone(),
            external_images_dir: config.external_images_dir.clone(),
            bundled_images_dir: config.bundled_images_dir.clone(),
            store,
        }
    }

    /// resolve
    ///
    /// Precedence chain, first match wins:
    /// 1. explicit `fileName -> directory` mapping (unconditional);
    /// 2. recently-uploaded convention (subfolder path containing a `temp_`
    ///    marker): the external uploads folder, then the bundled images folder;
    /// 3. each configured default search root, in listed order;
    /// 4. the generic external images folder;
    /// 5. the bundled images fallback, returned even if the file is absent.
    pub fn resolve(&self, file_name: &str) -> String {
        // 1. Explicit override table.
        if let Some(dir) = self.file_mappings.get(file_name) {
            return format!("{}{}", dir, file_name);
        }

        // 2. Recently uploaded files are addressed by a subfolder path that
        // carries the temporary-upload marker.
        if file_name.contains('/') && file_name.contains("temp_") {
            let external = format!("{}{}", self.external_images_dir, file_name);
            if self.store.exists(&external) {
                return external;
            }
            let bundled = format!("{}{}", self.bundled_images_dir, file_name);
            if self.store.exists(&bundled) {
                return bundled;
            }
        }

        // 3. Configured default search roots, in order.
        for path in &self.default_paths {
            let candidate = format!("{}{}", path, file_name);
            if self.store.exists(&candidate) {
                return candidate;
            }
        }

        // 4. Generic external images folder.
        let external = format!("{}{}", self.external_images_dir, file_name);
        if self.store.exists(&external) {
            return external;
        }
        tracing::debug!(file_name, "not found in external images folder");

        // 5. Best-guess fallback; existence is the caller's problem.
        format!("{}{}", self.bundled_images_dir, file_name)
    }
}
