//! Per-request state passed explicitly through the engine.

use serde::{Deserialize, Serialize};

use super::pkce::PkceChallenge;
use super::scope;
use crate::error::PkceError;

/// Whether a `response_type` asks for tokens straight from the authorization
/// endpoint (implicit flow).
#[must_use]
pub fn is_implicit_response_type(response_type: &str) -> bool {
    response_type.split_whitespace().any(|t| matches!(t, "token" | "id_token"))
}

/// A token endpoint request.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TokenRequestContext {
    /// Client making the request.
    pub client_id: String,
    /// Secret, absent for public clients.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Requested scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// PKCE `code_verifier`.
    #[serde(default)]
    pub code_verifier: Option<String>,
    /// Tenant the request is addressed to.
    #[serde(default)]
    pub tenant_id: Option<i32>,
    /// Username asserted by the caller, if any.
    #[serde(default)]
    pub username_hint: Option<String>,
}

impl TokenRequestContext {
    /// Create a context for a public client.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), ..Self::default() }
    }

    /// Attach a client secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Attach a PKCE verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(verifier.into());
        self
    }

    /// Set scopes from a space-delimited string.
    #[must_use]
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scopes = scope::parse(Some(scope));
        self
    }

    /// Whether the client presented a secret.
    #[must_use]
    pub const fn is_confidential(&self) -> bool {
        self.client_secret.is_some()
    }
}

impl std::fmt::Debug for TokenRequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequestContext")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("scopes", &self.scopes)
            .field("code_verifier", &self.code_verifier.as_ref().map(|_| "[REDACTED]"))
            .field("tenant_id", &self.tenant_id)
            .field("username_hint", &self.username_hint)
            .finish()
    }
}

/// An authorization endpoint request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationRequestContext {
    pub client_id: String,
    pub response_type: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub code_challenge: Option<String>,
    #[serde(default)]
    pub code_challenge_method: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<i32>,
}

impl AuthorizationRequestContext {
    pub fn new(client_id: impl Into<String>, response_type: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), response_type: response_type.into(), ..Self::default() }
    }

    /// Validated PKCE challenge to bind to the issued code.
    ///
    /// `Ok(None)` when the client sent no challenge.
    ///
    /// # Errors
    ///
    /// See [`PkceChallenge::from_request`].
    pub fn pkce_challenge(&self) -> Result<Option<PkceChallenge>, PkceError> {
        self.code_challenge
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| PkceChallenge::from_request(c, self.code_challenge_method.as_deref()))
            .transpose()
    }

    #[must_use]
    pub fn is_implicit(&self) -> bool {
        is_implicit_response_type(&self.response_type)
    }

    /// Whether the `openid` scope was requested.
    #[must_use]
    pub fn is_oidc(&self) -> bool {
        scope::is_oidc_request(&self.scopes)
    }
}
