use cms_portal::css::rewrite_stylesheet;
use std::collections::HashMap;

fn tokens(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn rewrites_a_registered_background_image() {
    let map = tokens(&[("icons/logo.png", "feedface00000000feedface00000000")]);

    let out = rewrite_stylesheet("body { background-image:url('logo.png'); }", &map);
    assert_eq!(
        out,
        "body { background-image:url('/api/secure-images/feedface00000000feedface00000000'); }"
    );
}

#[test]
fn rewrites_the_background_shorthand() {
    let map = tokens(&[("banner.jpg", "t0")]);

    let out = rewrite_stylesheet(
        ".hero { background: url(\"../images/banner.jpg\") no-repeat; }",
        &map,
    );
    assert_eq!(
        out,
        ".hero { background: url(\"/api/secure-images/t0\") no-repeat; }"
    );
}

#[test]
fn matching_is_case_insensitive_on_the_property() {
    let map = tokens(&[("logo.png", "t1")]);

    let out = rewrite_stylesheet("BACKGROUND-IMAGE: URL(logo.png)", &map);
    assert_eq!(out, "BACKGROUND-IMAGE: URL(/api/secure-images/t1)");
}

#[test]
fn absolute_and_data_urls_pass_through() {
    let map = tokens(&[("logo.png", "t1")]);

    let absolute = "a { background-image: url(http://cdn.example/logo.png); }";
    assert_eq!(rewrite_stylesheet(absolute, &map), absolute);

    let data = "a { background-image: url(data:image/png;base64,AAAA); }";
    assert_eq!(rewrite_stylesheet(data, &map), data);
}

#[test]
fn query_strings_are_ignored_when_matching() {
    let map = tokens(&[("logo.png", "t1")]);

    let out = rewrite_stylesheet("b { background: url(logo.png?v=3); }", &map);
    assert_eq!(out, "b { background: url(/api/secure-images/t1); }");
}

#[test]
fn non_image_extensions_are_left_alone() {
    let map = tokens(&[("icon.woff2", "t1")]);

    let css = "@font-face { src: url(icon.woff2); } b { background: url(icon.woff2); }";
    assert_eq!(rewrite_stylesheet(css, &map), css);
}

#[test]
fn unregistered_filenames_are_left_alone() {
    let map = tokens(&[("logo.png", "t1")]);

    let css = "b { background: url(missing.png); }";
    assert_eq!(rewrite_stylesheet(css, &map), css);
}

#[test]
fn non_background_urls_are_not_touched() {
    let map = tokens(&[("logo.png", "t1")]);

    let css = ".x { mask-image: url(logo.png); }";
    assert_eq!(rewrite_stylesheet(css, &map), css);
}

#[test]
fn session_scoped_keys_match_by_suffix() {
    let map = tokens(&[("0123456789abcdef:icons/logo.png", "t9")]);

    let out = rewrite_stylesheet("b { background-image: url(logo.png); }", &map);
    assert_eq!(out, "b { background-image: url(/api/secure-images/t9); }");
}

#[test]
fn shared_suffixes_resolve_to_one_of_the_candidates() {
    // Two registered keys end in the same filename. Which token wins depends
    // on map iteration order, which is unspecified — both outcomes are valid.
    let map = tokens(&[("dark/logo.png", "tdark"), ("light/logo.png", "tlight")]);

    let out = rewrite_stylesheet("b { background: url(logo.png); }", &map);
    let dark = "b { background: url(/api/secure-images/tdark); }";
    let light = "b { background: url(/api/secure-images/tlight); }";
    assert!(out == dark || out == light, "unexpected rewrite: {out}");
}

#[test]
fn rewrites_every_occurrence_in_one_pass() {
    let map = tokens(&[("a.png", "ta"), ("b.gif", "tb")]);

    let css = ".a { background: url(a.png); }\n.b { background-image: url('b.gif'); }";
    let out = rewrite_stylesheet(css, &map);
    assert_eq!(
        out,
        ".a { background: url(/api/secure-images/ta); }\n.b { background-image: url('/api/secure-images/tb'); }"
    );
}

#[test]
fn empty_map_leaves_the_stylesheet_unchanged() {
    let css = "b { background: url(logo.png); }";
    assert_eq!(rewrite_stylesheet(css, &HashMap::new()), css);
}
