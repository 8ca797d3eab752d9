//! Cache-aside access token lookup.

use std::sync::Arc;

use crate::cache::{CacheEntry, CredentialCache};
use crate::error::{OAuthError, OAuthResult};
use crate::models::AccessTokenRecord;
use crate::store::TokenStore;

/// Resolves token identifiers to their records.
#[derive(Clone)]
pub struct TokenLookupService {
    store: Arc<dyn TokenStore>,
    cache: CredentialCache,
}

impl TokenLookupService {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, cache: CredentialCache) -> Self {
        Self { store, cache }
    }

    /// Record for `token_identifier`, from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidToken`] for an unknown identifier and
    /// [`OAuthError::Store`] when the token store fails.
    pub async fn resolve(&self, token_identifier: &str) -> OAuthResult<AccessTokenRecord> {
        if let Some(record) = self.cache.access_token(token_identifier).await {
            tracing::debug!(consumer_key = %record.consumer_key, "Token record found in cache");
            return Ok(record);
        }

        let record =
            self.store.lookup_token(token_identifier).await?.ok_or(OAuthError::InvalidToken)?;

        tracing::debug!(consumer_key = %record.consumer_key, "Token record loaded from store");
        self.cache.put(token_identifier, CacheEntry::AccessToken(record.clone())).await;
        Ok(record)
    }

    /// Client id the token was issued to.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub async fn client_id_for_token(&self, token_identifier: &str) -> OAuthResult<String> {
        Ok(self.resolve(token_identifier).await?.consumer_key)
    }
}

impl std::fmt::Debug for TokenLookupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenLookupService").field("cache", &self.cache).finish_non_exhaustive()
    }
}
