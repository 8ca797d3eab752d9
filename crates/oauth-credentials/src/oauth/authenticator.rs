//! Client credential authentication.
//!
//! Secrets are looked up cache-first and compared in constant time. Only
//! successful lookups are written back to the cache, so a probe with an
//! unknown client id or a wrong secret never leaves an entry behind.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::cache::{CacheEntry, CredentialCache};
use crate::error::OAuthResult;
use crate::models::{CachedPrincipal, ClientCredential};
use crate::store::CredentialStore;

/// Cache key for the owner of a client.
///
/// Lowercased when the user store compares usernames case-insensitively.
#[must_use]
pub fn principal_cache_key(client_id: &str, username: &str, case_sensitive: bool) -> String {
    let key = format!("{client_id}:{username}");
    if case_sensitive { key } else { key.to_lowercase() }
}

/// Authenticates OAuth clients against the credential store.
#[derive(Clone)]
pub struct ClientAuthenticator {
    store: Arc<dyn CredentialStore>,
    cache: CredentialCache,
}

impl ClientAuthenticator {
    /// Create an authenticator.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, cache: CredentialCache) -> Self {
        Self { store, cache }
    }

    /// Check `client_secret` against the secret registered for `client_id`.
    ///
    /// Unknown clients and wrong secrets are `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the credential store fails.
    pub async fn authenticate(&self, client_id: &str, client_secret: &str) -> OAuthResult<bool> {
        if let Some(cached) = self.cache.client_credential(client_id).await {
            tracing::debug!(client_id, "Client credentials found in cache");
            return Ok(secrets_match(&cached.client_secret, client_secret));
        }

        tracing::debug!(client_id, "Client credentials not cached, querying store");
        let Some(stored) = self.store.lookup_secret(client_id).await? else {
            tracing::debug!(client_id, "No client registered under this id");
            return Ok(false);
        };

        if !secrets_match(&stored, client_secret) {
            tracing::debug!(client_id, "Client secret mismatch");
            return Ok(false);
        }

        self.cache
            .put(client_id, CacheEntry::ClientCredential(ClientCredential::new(client_id, stored)))
            .await;
        Ok(true)
    }

    /// Username of the user that owns the client.
    ///
    /// `Ok(None)` when the credentials do not authenticate or the store has
    /// no owner for them.
    ///
    /// # Errors
    ///
    /// Returns an error only when the credential store fails.
    pub async fn resolve_authenticated_username(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> OAuthResult<Option<String>> {
        self.resolve_authenticated_username_with_hint(client_id, client_secret, None).await
    }

    /// Like [`Self::resolve_authenticated_username`], consulting the principal
    /// cache under `username_hint` before going to the store.
    ///
    /// # Errors
    ///
    /// Returns an error only when the credential store fails.
    pub async fn resolve_authenticated_username_with_hint(
        &self,
        client_id: &str,
        client_secret: &str,
        username_hint: Option<&str>,
    ) -> OAuthResult<Option<String>> {
        if !self.authenticate(client_id, client_secret).await? {
            return Ok(None);
        }

        if let Some(hint) = username_hint {
            let key =
                principal_cache_key(client_id, hint, self.store.is_username_case_sensitive(hint));
            if let Some(principal) = self.cache.principal(&key).await {
                if principal.client_id == client_id {
                    tracing::debug!(client_id, "Client owner found in cache");
                    return Ok(Some(principal.username));
                }
            }
        }

        let username = self.store.lookup_username(client_id, client_secret).await?;
        if let Some(name) = &username {
            let key =
                principal_cache_key(client_id, name, self.store.is_username_case_sensitive(name));
            self.cache.put(key, CacheEntry::Principal(CachedPrincipal::new(client_id, name))).await;
        }
        Ok(username)
    }
}

impl std::fmt::Debug for ClientAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAuthenticator").field("cache", &self.cache).finish_non_exhaustive()
    }
}

fn secrets_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
