//! Tests for the auth module

use super::*;

#[test]
fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();
    let req = auth.apply(client.get("https://example.com/api"));

    let built = req.build().unwrap();
    assert!(built.headers().get("Authorization").is_none());
    assert!(auth.authorization_header().is_none());
}

#[test]
fn test_bearer_header() {
    let auth = Authenticator::bearer("token-123").unwrap();
    let client = reqwest::Client::new();
    let req = auth.apply(client.get("https://facebook.example-analytics.com/brands/1"));

    let built = req.build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer token-123"
    );
    assert_eq!(
        auth.authorization_header(),
        Some("Bearer token-123".to_string())
    );
}

#[test]
fn test_bearer_trims_token() {
    let auth = Authenticator::bearer("  abc \n").unwrap();
    assert_eq!(auth.config(), &AuthConfig::bearer("abc"));
}

#[test]
fn test_empty_token_is_config_error() {
    let err = Authenticator::bearer("   ").unwrap_err();
    assert!(matches!(err, crate::Error::MissingConfigField { ref field } if field == "api_key"));
}

#[test]
fn test_debug_redacts_token() {
    let config = AuthConfig::bearer("super-secret");
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("redacted"));
}

#[test]
fn test_auth_config_default() {
    assert_eq!(AuthConfig::default(), AuthConfig::None);
}
