//! Authorization code exchange validation.
//!
//! Ties the other components together for the `authorization_code` grant:
//! client authentication, code ownership, PKCE and scope hashing.

use serde::Serialize;

use super::app_info::AppInfoResolver;
use super::authenticator::ClientAuthenticator;
use super::context::TokenRequestContext;
use super::pkce::{self, PkceChallenge};
use super::scope;
use crate::error::OAuthResult;
use crate::models::AuthenticatedUser;

/// What was recorded when the authorization code was issued.
///
/// Consumed by [`CodeExchangeValidator::validate`], so a binding can back at
/// most one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCodeBinding {
    /// Client the code was issued to.
    pub client_id: String,
    /// Scopes the user authorized.
    pub scopes: Vec<String>,
    /// PKCE challenge sent with the authorization request.
    pub pkce: Option<PkceChallenge>,
    /// Qualified name of the user who authorized the code.
    pub authorized_user: String,
}

impl AuthorizationCodeBinding {
    pub fn new(client_id: impl Into<String>, authorized_user: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scopes: Vec::new(),
            pkce: None,
            authorized_user: authorized_user.into(),
        }
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_pkce(mut self, challenge: PkceChallenge) -> Self {
        self.pkce = Some(challenge);
        self
    }
}

/// Why an exchange was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Client credentials did not authenticate.
    InvalidClient,
    /// The code was issued to a different client.
    ClientMismatch,
    /// The verifier does not match the bound challenge.
    PkceMismatch,
}

impl RejectReason {
    /// RFC 6749 error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient => "invalid_client",
            Self::ClientMismatch | Self::PkceMismatch => "invalid_grant",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidClient => f.write_str("client authentication failed"),
            Self::ClientMismatch => f.write_str("authorization code was issued to another client"),
            Self::PkceMismatch => f.write_str("PKCE verification failed"),
        }
    }
}

/// A successful exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub client_id: String,
    pub authorized_user: AuthenticatedUser,
    /// Canonical scope string.
    pub scope: Option<String>,
    /// MD5 of [`Self::scope`], used to index issued tokens.
    pub scope_hash: Option<String>,
    /// The grant is an OpenID Connect grant.
    pub openid: bool,
}

/// Outcome of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeDecision {
    Granted(Grant),
    Rejected(RejectReason),
}

impl ExchangeDecision {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Validates authorization code exchanges.
#[derive(Debug, Clone)]
pub struct CodeExchangeValidator {
    authenticator: ClientAuthenticator,
    apps: AppInfoResolver,
    pkce_enabled: bool,
}

impl CodeExchangeValidator {
    #[must_use]
    pub const fn new(authenticator: ClientAuthenticator, apps: AppInfoResolver, pkce_enabled: bool) -> Self {
        Self { authenticator, apps, pkce_enabled }
    }

    /// Validate a token request against the binding of its authorization code.
    ///
    /// # Errors
    ///
    /// PKCE policy violations, unknown applications, unparseable authorized
    /// users and store faults are errors. Credential or verifier mismatches
    /// are [`ExchangeDecision::Rejected`].
    pub async fn validate(
        &self,
        ctx: &TokenRequestContext,
        binding: AuthorizationCodeBinding,
    ) -> OAuthResult<ExchangeDecision> {
        let client_id = ctx.client_id.as_str();

        if let Some(secret) = ctx.client_secret.as_deref() {
            if !self.authenticator.authenticate(client_id, secret).await? {
                return Ok(ExchangeDecision::Rejected(RejectReason::InvalidClient));
            }
        }

        if binding.client_id != client_id {
            tracing::debug!(client_id, "Authorization code presented by a different client");
            return Ok(ExchangeDecision::Rejected(RejectReason::ClientMismatch));
        }

        let app = self.apps.app_information(client_id).await?;
        let policy = app.pkce_policy(self.pkce_enabled);
        let (challenge, method) = binding
            .pkce
            .as_ref()
            .map_or((None, None), |p| (Some(p.code_challenge.as_str()), Some(p.method.as_str())));

        if !pkce::verify(challenge, ctx.code_verifier.as_deref(), method, &policy)? {
            tracing::debug!(client_id, "PKCE verifier does not match the bound challenge");
            return Ok(ExchangeDecision::Rejected(RejectReason::PkceMismatch));
        }

        let authorized_user = AuthenticatedUser::from_qualified_username(&binding.authorized_user)?;
        let scope = scope::canonicalize(Some(binding.scopes.as_slice()));
        let scope_hash = scope::hash(Some(binding.scopes.as_slice()));
        let openid = scope::is_oidc_request(&binding.scopes);

        tracing::info!(client_id, tenant = %authorized_user.tenant_domain, openid, "Authorization code exchange granted");

        Ok(ExchangeDecision::Granted(Grant {
            client_id: binding.client_id,
            authorized_user,
            scope,
            scope_hash,
            openid,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::CredentialCache;
    use crate::config::Config;
    use crate::models::AppMetadata;
    use crate::store::InMemoryStore;

    const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

    async fn validator() -> CodeExchangeValidator {
        let store = Arc::new(InMemoryStore::new());
        store.register_client("client-a", "secret-a", "alice").await;
        store.register_app(AppMetadata::new("client-a")).await;

        let cache = CredentialCache::from_config(&Config::for_testing());
        CodeExchangeValidator::new(
            ClientAuthenticator::new(store.clone(), cache.clone()),
            AppInfoResolver::new(store, cache),
            true,
        )
    }

    fn binding() -> AuthorizationCodeBinding {
        AuthorizationCodeBinding::new("client-a", "alice@wso2.com")
            .with_scopes(vec!["profile".into(), "openid".into()])
            .with_pkce(PkceChallenge::from_request(&pkce::compute_s256_challenge(VERIFIER), Some("S256")).unwrap())
    }

    #[tokio::test]
    async fn test_granted() {
        let ctx = TokenRequestContext::new("client-a").with_secret("secret-a").with_verifier(VERIFIER);
        let ExchangeDecision::Granted(grant) = validator().await.validate(&ctx, binding()).await.unwrap() else {
            panic!("expected a grant");
        };
        assert_eq!(grant.scope.as_deref(), Some("openid profile"));
        assert_eq!(grant.scope_hash, scope::hash(Some(&["openid profile"][..])));
        assert!(grant.openid);
        assert_eq!(grant.authorized_user.tenant_domain, "wso2.com");
    }

    #[tokio::test]
    async fn test_rejections() {
        let v = validator().await;

        let wrong_secret = TokenRequestContext::new("client-a").with_secret("nope").with_verifier(VERIFIER);
        assert_eq!(
            v.validate(&wrong_secret, binding()).await.unwrap(),
            ExchangeDecision::Rejected(RejectReason::InvalidClient)
        );

        let other_client = TokenRequestContext::new("client-b").with_verifier(VERIFIER);
        assert_eq!(
            v.validate(&other_client, binding()).await.unwrap(),
            ExchangeDecision::Rejected(RejectReason::ClientMismatch)
        );

        let wrong_verifier = TokenRequestContext::new("client-a").with_verifier("a".repeat(43));
        assert_eq!(
            v.validate(&wrong_verifier, binding()).await.unwrap(),
            ExchangeDecision::Rejected(RejectReason::PkceMismatch)
        );
    }

    #[tokio::test]
    async fn test_missing_verifier_is_an_error() {
        let ctx = TokenRequestContext::new("client-a");
        let err = validator().await.validate(&ctx, binding()).await.unwrap_err();
        assert_eq!(err.error_code(), "invalid_grant");
    }
}
