//! Application metadata lookup.

use std::sync::Arc;

use crate::cache::{CacheEntry, CredentialCache};
use crate::error::{OAuthError, OAuthResult};
use crate::models::AppMetadata;
use crate::store::AppMetadataStore;

/// Cache key for the metadata of `client_id`.
///
/// Namespaced so it never shares a slot with the client credential, which is
/// keyed by the bare client id.
#[must_use]
pub fn app_info_cache_key(client_id: &str) -> String {
    format!("app_info:{client_id}")
}

/// Cache-aside resolver for registered application metadata.
#[derive(Clone)]
pub struct AppInfoResolver {
    store: Arc<dyn AppMetadataStore>,
    cache: CredentialCache,
}

impl AppInfoResolver {
    #[must_use]
    pub fn new(store: Arc<dyn AppMetadataStore>, cache: CredentialCache) -> Self {
        Self { store, cache }
    }

    /// Metadata of the application registered under `client_id`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UnknownApplication`] when nothing is registered
    /// under `client_id`. Misses are not cached.
    pub async fn app_information(&self, client_id: &str) -> OAuthResult<AppMetadata> {
        let key = app_info_cache_key(client_id);
        if let Some(app) = self.cache.app_info(&key).await {
            tracing::debug!(client_id, "Application metadata found in cache");
            return Ok(app);
        }

        let app = self
            .store
            .lookup_app(client_id)
            .await?
            .ok_or_else(|| OAuthError::unknown_application(client_id))?;

        self.cache.put(key, CacheEntry::AppInfo(app.clone())).await;
        Ok(app)
    }
}

impl std::fmt::Debug for AppInfoResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppInfoResolver").field("cache", &self.cache).finish_non_exhaustive()
    }
}
