use cms_portal::registry::TokenRegistry;
use std::sync::Arc;
use std::time::Duration;

const TWO_HOURS: Duration = Duration::from_secs(2 * 60 * 60);

fn registry() -> TokenRegistry {
    TokenRegistry::new(TWO_HOURS, TWO_HOURS)
}

#[test]
fn issuance_is_idempotent_per_binding_key() {
    let registry = registry();

    let first = registry.issue_or_reuse("sess-1:logo.png");
    let second = registry.issue_or_reuse("sess-1:logo.png");
    assert_eq!(first, second);

    let other = registry.issue_or_reuse("sess-2:logo.png");
    assert_ne!(first, other);
}

#[test]
fn tokens_are_32_hex_characters() {
    let registry = registry();
    let token = registry.issue_or_reuse("logo.png");

    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn reverse_lookup_strips_session_scope() {
    let registry = registry();

    let scoped = registry.issue_or_reuse("sess-1:icons/logo.png");
    assert_eq!(
        registry.file_name_for(&scoped).as_deref(),
        Some("icons/logo.png")
    );

    let bare = registry.issue_or_reuse("banner.jpg");
    assert_eq!(registry.file_name_for(&bare).as_deref(), Some("banner.jpg"));

    assert_eq!(registry.file_name_for("deadbeef"), None);
}

#[tokio::test]
async fn tokens_expire_after_the_resource_ttl() {
    let registry = TokenRegistry::new(Duration::from_millis(40), TWO_HOURS);

    let token = registry.issue_or_reuse("logo.png");
    assert!(!registry.is_expired(&token));

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(registry.is_expired(&token));
}

#[test]
fn unknown_tokens_count_as_expired() {
    let registry = registry();
    assert!(registry.is_expired("0123456789abcdef0123456789abcdef"));
}

#[test]
fn rotation_invalidates_the_old_token_and_rebinds_the_bare_name() {
    let registry = registry();

    let old = registry.issue_or_reuse("sess-1:logo.png");
    let fresh = registry.rotate("logo.png", &old);

    assert_ne!(old, fresh);
    // The old token is fully discarded: no binding, no timestamp.
    assert_eq!(registry.file_name_for(&old), None);
    assert!(registry.is_expired(&old));
    // The replacement is bound to the bare filename and live.
    assert_eq!(registry.file_name_for(&fresh).as_deref(), Some("logo.png"));
    assert!(!registry.is_expired(&fresh));
    assert_eq!(registry.token_for("logo.png").as_deref(), Some(&*fresh));
}

#[test]
fn clear_drops_resource_tokens_but_keeps_session_bindings() {
    let registry = registry();

    registry.issue_or_reuse("logo.png");
    registry.issue_or_reuse("sess-1:banner.jpg");
    registry.force_new_session_token("sess-1");

    registry.clear_resource_tokens();

    assert!(registry.is_empty());
    assert!(registry.mapping().is_empty());
    assert!(registry.has_live_session("sess-1"));
}

#[test]
fn session_tokens_always_rotate() {
    let registry = registry();

    let first = registry.force_new_session_token("sess-1");
    let second = registry.force_new_session_token("sess-1");

    assert_ne!(first, second);
    assert!(registry.has_live_session("sess-1"));
    assert!(!registry.has_live_session("sess-2"));
}

#[tokio::test]
async fn session_bindings_expire_lazily() {
    let registry = TokenRegistry::new(TWO_HOURS, Duration::from_millis(40));

    registry.force_new_session_token("sess-1");
    assert!(registry.has_live_session("sess-1"));

    tokio::time::sleep(Duration::from_millis(80)).await;
    // The binding is still stored — nothing sweeps it — but it no longer counts as live.
    assert!(!registry.has_live_session("sess-1"));
}

#[test]
fn bound_session_token_reuses_the_given_value() {
    let registry = registry();

    let image_token = registry.issue_or_reuse("sess-1:logo.png");
    registry.bind_session_token("sess-1", &image_token);

    assert!(registry.has_live_session("sess-1"));
}

#[tokio::test]
async fn concurrent_issuance_for_one_key_yields_one_token() {
    let registry = Arc::new(TokenRegistry::new(TWO_HOURS, TWO_HOURS));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry.issue_or_reuse("sess-1:logo.png")
        }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap());
    }

    tokens.dedup();
    assert_eq!(tokens.len(), 1, "racing issuers must observe one token");
    assert_eq!(registry.len(), 1);
}
