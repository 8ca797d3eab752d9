//! Client credentials and resolved principals.

use serde::{Deserialize, Serialize};

/// A client id and the secret issued to it at registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredential {
    /// OAuth client id (consumer key).
    pub client_id: String,
    /// Client secret as stored.
    pub client_secret: String,
}

impl ClientCredential {
    /// Create a credential.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }
}

impl std::fmt::Debug for ClientCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// The user that owns a client, as resolved from the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPrincipal {
    /// Client the user owns.
    pub client_id: String,
    /// Username exactly as returned by the store.
    pub username: String,
}

impl CachedPrincipal {
    /// Create a principal.
    pub fn new(client_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), username: username.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secret() {
        let credential = ClientCredential::new("client-a", "super-secret-value");
        let debug = format!("{credential:?}");
        assert!(debug.contains("client-a"));
        assert!(!debug.contains("super-secret-value"));
    }
}
