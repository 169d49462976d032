use cms_portal::config::{AppConfig, parse_list, parse_mappings};

#[test]
fn parse_list_trims_and_drops_empty_segments() {
    assert_eq!(
        parse_list("static/images/, static/icons/ ,,"),
        vec!["static/images/".to_string(), "static/icons/".to_string()]
    );
    assert!(parse_list("").is_empty());
}

#[test]
fn parse_list_preserves_order() {
    // Listed order is contractual for the resolver's default roots.
    assert_eq!(
        parse_list("b/,a/,c/"),
        vec!["b/".to_string(), "a/".to_string(), "c/".to_string()]
    );
}

#[test]
fn parse_mappings_reads_k_v_pairs() {
    let mappings = parse_mappings("logo.png=static/images/brand/, banner.jpg=images/");
    assert_eq!(
        mappings.get("logo.png").map(String::as_str),
        Some("static/images/brand/")
    );
    assert_eq!(
        mappings.get("banner.jpg").map(String::as_str),
        Some("images/")
    );
}

#[test]
fn parse_mappings_skips_malformed_segments() {
    let mappings = parse_mappings("no-separator, =missing-name, missing-dir=, ok=dir/");
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings.get("ok").map(String::as_str), Some("dir/"));
}

#[test]
fn defaults_describe_a_bare_deployment() {
    let config = AppConfig::default();

    assert_eq!(config.asset_root, ".");
    assert!(config.file_mappings.is_empty());
    assert_eq!(config.default_paths, vec!["static/images/".to_string()]);
    assert_eq!(config.external_images_dir, "images/");
    assert_eq!(config.bundled_images_dir, "static/images/");
    assert_eq!(config.css_dir, "static/style/");
    // Both token classes default to the two-hour window.
    assert_eq!(config.resource_token_ttl_secs, 7200);
    assert_eq!(config.session_token_ttl_secs, 7200);
}
