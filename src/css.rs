use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::storage;

/// Base path of the gateway's HTTP surface; rewritten URLs point below it.
pub const SECURE_IMAGE_BASE: &str = "/api/secure-images";

// Matches background / background-image declarations and captures the url()
// operand. Textual pattern match, not a CSS parser: @import, multi-URL
// shorthand and vendor-prefixed properties beyond these two keywords are out
// of scope for this transform.
static BACKGROUND_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:\s*url\(['"]?([^'")]+)['"]?\)"#).unwrap()
});

// Trailing image-extension check, tolerating a query string.
static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(png|jpg|jpeg|gif|svg|ico|webp)(\?.*)?$").unwrap());

/// rewrite_stylesheet
///
/// Scans stylesheet text for `background`/`background-image: url(...)`
/// references and replaces each relative image URL with the gateway URL of
/// the token registered for that filename. Absolute (`http…`) and embedded
/// (`data:`) URLs pass through unchanged, as do URLs whose filename is not a
/// known image type or has no registered token. Pure function over the given
/// binding-key snapshot; the snapshot is not mutated.
pub fn rewrite_stylesheet(css: &str, tokens: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(css.len());
    let mut last = 0;

    for caps in BACKGROUND_URL.captures_iter(css) {
        let url = caps.get(1).expect("capture group 1 always present");
        out.push_str(&css[last..url.start()]);
        out.push_str(&secure_url_for(url.as_str(), tokens));
        last = url.end();
    }

    out.push_str(&css[last..]);
    out
}

/// secure_url_for
///
/// Maps one extracted URL to its gateway form, or returns it unchanged.
/// Matching is by suffix over the binding keys: a key like
/// `sessionId:icons/logo.png` matches the filename `logo.png`. When several
/// keys share a trailing filename the first map-iteration hit wins; that
/// order is unspecified.
fn secure_url_for(url: &str, tokens: &HashMap<String, String>) -> String {
    if url.starts_with("http") || url.starts_with("data:") {
        return url.to_string();
    }

    if let Some(file_name) = extract_file_name(url) {
        if IMAGE_EXTENSION.is_match(file_name) {
            for (key, token) in tokens {
                if key.ends_with(file_name) {
                    return format!("{}/{}", SECURE_IMAGE_BASE, token);
                }
            }
        }
    }

    url.to_string()
}

/// extract_file_name
///
/// Trailing path component of the URL, with any query string stripped.
fn extract_file_name(url: &str) -> Option<&str> {
    let clean = url.split('?').next().unwrap_or(url);
    clean.rsplit('/').next()
}

/// css_source_path
///
/// Store path of a named stylesheet, with traversal segments removed from the
/// caller-provided name before it touches the store.
pub fn css_source_path(css_dir: &str, css_file_name: &str) -> String {
    format!("{}{}", css_dir, storage::sanitize_path(css_file_name))
}
