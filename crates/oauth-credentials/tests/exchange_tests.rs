//! Authorization code exchange tests.

mod common;

use std::sync::Arc;

use common::CountingStore;
use oauth_credentials::config::Config;
use oauth_credentials::models::AppMetadata;
use oauth_credentials::oauth::pkce::{self, PkceChallenge};
use oauth_credentials::oauth::{
    AppInfoResolver, AuthorizationCodeBinding, ClientAuthenticator, CodeExchangeValidator,
    ExchangeDecision, RejectReason, TokenRequestContext,
};
use oauth_credentials::store::InMemoryStore;
use oauth_credentials::{CredentialCache, OAuthError, PkceError};

const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
const CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

async fn validator(app: AppMetadata, pkce_enabled: bool) -> (Arc<CountingStore>, CodeExchangeValidator) {
    let inner = InMemoryStore::new();
    inner.register_client(app.client_id.clone(), "secret", "admin").await;
    inner.register_app(app).await;
    let store = CountingStore::new(inner);

    let cache = CredentialCache::from_config(&Config::for_testing());
    let validator = CodeExchangeValidator::new(
        ClientAuthenticator::new(store.clone(), cache.clone()),
        AppInfoResolver::new(store.clone(), cache),
        pkce_enabled,
    );
    (store, validator)
}

fn s256_binding(client_id: &str) -> AuthorizationCodeBinding {
    AuthorizationCodeBinding::new(client_id, "PRIMARY/admin@carbon.super")
        .with_scopes(vec!["read".into(), "write".into()])
        .with_pkce(PkceChallenge::from_request(CHALLENGE, Some("S256")).unwrap())
}

#[tokio::test]
async fn test_public_client_with_s256() {
    let (store, v) = validator(AppMetadata::new("spa"), true).await;
    let ctx = TokenRequestContext::new("spa").with_verifier(VERIFIER);

    let decision = v.validate(&ctx, s256_binding("spa")).await.unwrap();
    let ExchangeDecision::Granted(grant) = decision else {
        panic!("expected grant, got {decision:?}");
    };
    assert_eq!(grant.scope.as_deref(), Some("read write"));
    assert!(!grant.openid);
    assert_eq!(grant.authorized_user.username, "admin");
    // public clients skip client authentication
    assert_eq!(store.secret_lookups(), 0);
}

#[tokio::test]
async fn test_scope_hash_matches_codec() {
    let (_store, v) = validator(AppMetadata::new("spa"), true).await;
    let ctx = TokenRequestContext::new("spa").with_verifier(VERIFIER);

    let ExchangeDecision::Granted(grant) = v.validate(&ctx, s256_binding("spa")).await.unwrap() else {
        panic!("expected grant");
    };
    assert_eq!(grant.scope_hash, oauth_credentials::oauth::scope::hash_scope_string(Some("write read")));
}

#[tokio::test]
async fn test_confidential_client_wrong_secret() {
    let (_store, v) = validator(AppMetadata::new("web"), true).await;
    let ctx = TokenRequestContext::new("web").with_secret("wrong").with_verifier(VERIFIER);

    let decision = v.validate(&ctx, s256_binding("web")).await.unwrap();
    assert_eq!(decision, ExchangeDecision::Rejected(RejectReason::InvalidClient));
    assert_eq!(RejectReason::InvalidClient.error_code(), "invalid_client");
}

#[tokio::test]
async fn test_plain_refused_for_app() {
    let (_store, v) = validator(AppMetadata::new("web"), true).await;
    let binding = AuthorizationCodeBinding::new("web", "admin")
        .with_pkce(PkceChallenge::from_request(VERIFIER, Some("plain")).unwrap());
    let ctx = TokenRequestContext::new("web").with_secret("secret").with_verifier(VERIFIER);

    let err = v.validate(&ctx, binding).await.unwrap_err();
    assert!(matches!(err, OAuthError::Pkce(PkceError::PlainNotAllowed)));
}

#[tokio::test]
async fn test_plain_allowed_for_app() {
    let app = AppMetadata { pkce_support_plain: true, ..AppMetadata::new("web") };
    let (_store, v) = validator(app, true).await;
    let binding = AuthorizationCodeBinding::new("web", "admin")
        .with_pkce(PkceChallenge::from_request(VERIFIER, None).unwrap());
    let ctx = TokenRequestContext::new("web").with_secret("secret").with_verifier(VERIFIER);

    assert!(v.validate(&ctx, binding).await.unwrap().is_granted());
}

#[tokio::test]
async fn test_mandatory_pkce_without_binding() {
    let app = AppMetadata { pkce_mandatory: true, ..AppMetadata::new("web") };
    let (_store, v) = validator(app, true).await;
    let ctx = TokenRequestContext::new("web").with_secret("secret");

    let err = v.validate(&ctx, AuthorizationCodeBinding::new("web", "admin")).await.unwrap_err();
    assert!(matches!(err, OAuthError::Pkce(PkceError::MissingVerifier)));
    assert_eq!(err.error_code(), "invalid_request");
}

#[tokio::test]
async fn test_pkce_disabled_globally() {
    let app = AppMetadata { pkce_mandatory: true, ..AppMetadata::new("web") };
    let (_store, v) = validator(app, false).await;
    let ctx = TokenRequestContext::new("web").with_secret("secret");

    assert!(v.validate(&ctx, s256_binding("web")).await.unwrap().is_granted());
}

#[tokio::test]
async fn test_unregistered_application() {
    let (_store, v) = validator(AppMetadata::new("web"), true).await;
    let ctx = TokenRequestContext::new("ghost").with_verifier(VERIFIER);

    let err = v.validate(&ctx, s256_binding("ghost")).await.unwrap_err();
    assert!(matches!(err, OAuthError::UnknownApplication { .. }));
}

#[tokio::test]
async fn test_openid_grant() {
    let (_store, v) = validator(AppMetadata::new("spa"), true).await;
    let verifier = "v".repeat(80);
    let binding = AuthorizationCodeBinding::new("spa", "admin@tenant.org")
        .with_scopes(vec!["openid".into()])
        .with_pkce(PkceChallenge::from_request(&pkce::compute_s256_challenge(&verifier), Some("S256")).unwrap());
    let ctx = TokenRequestContext::new("spa").with_verifier(verifier);

    let ExchangeDecision::Granted(grant) = v.validate(&ctx, binding).await.unwrap() else {
        panic!("expected grant");
    };
    assert!(grant.openid);
    assert_eq!(grant.authorized_user.tenant_domain, "tenant.org");
}

#[tokio::test]
async fn test_shared_cache_keeps_credentials_and_metadata_apart() {
    let inner = InMemoryStore::new();
    inner.register_client("client-a", "secret", "admin").await;
    inner.register_app(AppMetadata::new("client-a")).await;
    let store = CountingStore::new(inner);

    let cache = CredentialCache::from_config(&Config::for_testing());
    let auth = ClientAuthenticator::new(store.clone(), cache.clone());
    let apps = AppInfoResolver::new(store.clone(), cache);

    for _ in 0..3 {
        assert!(auth.authenticate("client-a", "secret").await.unwrap());
        assert_eq!(apps.app_information("client-a").await.unwrap().client_id, "client-a");
    }

    assert_eq!(store.secret_lookups(), 1);
    assert_eq!(store.app_lookups(), 1);
}

#[tokio::test]
async fn test_repeated_confidential_exchange_is_served_from_cache() {
    let (store, v) = validator(AppMetadata::new("web"), true).await;
    let ctx = TokenRequestContext::new("web").with_secret("secret").with_verifier(VERIFIER);

    for _ in 0..3 {
        assert!(v.validate(&ctx, s256_binding("web")).await.unwrap().is_granted());
    }

    assert_eq!(store.secret_lookups(), 1);
    assert_eq!(store.app_lookups(), 1);
}
