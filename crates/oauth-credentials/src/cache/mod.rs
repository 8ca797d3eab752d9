//! Cache-aside store for credentials, principals, tokens and app metadata.
//!
//! One keyspace holds several payload shapes, so values are wrapped in
//! [`CacheEntry`]. Typed accessors on [`CredentialCache`] treat a wrong
//! variant exactly like a miss.

mod memory;

pub use memory::MokaCacheService;

use std::sync::Arc;

use crate::config::Config;
use crate::error::CacheError;
use crate::models::{AccessTokenRecord, AppMetadata, CachedPrincipal, ClientCredential};

/// A value held by the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// Client secret keyed by client id.
    ClientCredential(ClientCredential),
    /// Owner of a client keyed by `client_id:username`.
    Principal(CachedPrincipal),
    /// Token record keyed by token identifier.
    AccessToken(AccessTokenRecord),
    /// Application metadata keyed by `app_info:{client_id}`.
    AppInfo(AppMetadata),
}

impl CacheEntry {
    /// Variant name, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ClientCredential(_) => "client_credential",
            Self::Principal(_) => "principal",
            Self::AccessToken(_) => "access_token",
            Self::AppInfo(_) => "app_info",
        }
    }
}

/// Key/value cache collaborator.
///
/// Implementations must be safe for concurrent use and must not lose a write
/// to a key because of a concurrent write to the same key.
#[async_trait::async_trait]
pub trait CacheService: Send + Sync {
    /// Fetch the entry stored under `key`.
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Store `entry` under `key`, replacing any previous entry.
    async fn put(&self, key: String, entry: CacheEntry) -> Result<(), CacheError>;
}

/// Typed front for a [`CacheService`], or a no-op when caching is disabled.
#[derive(Clone)]
pub struct CredentialCache {
    backend: Option<Arc<dyn CacheService>>,
}

impl CredentialCache {
    /// Wrap a cache backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheService>) -> Self {
        Self { backend: Some(backend) }
    }

    /// A cache that never hits and drops every write.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build the moka-backed cache described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        if config.cache_enabled {
            Self::new(Arc::new(MokaCacheService::new(config.cache_max_size, config.cache_ttl)))
        } else {
            Self::disabled()
        }
    }

    /// Whether a backend is attached.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Look up a client credential.
    pub async fn client_credential(&self, key: &str) -> Option<ClientCredential> {
        match self.get(key).await? {
            CacheEntry::ClientCredential(credential) => Some(credential),
            other => Self::mismatch(&other),
        }
    }

    /// Look up a resolved principal.
    pub async fn principal(&self, key: &str) -> Option<CachedPrincipal> {
        match self.get(key).await? {
            CacheEntry::Principal(principal) => Some(principal),
            other => Self::mismatch(&other),
        }
    }

    /// Look up a token record.
    pub async fn access_token(&self, key: &str) -> Option<AccessTokenRecord> {
        match self.get(key).await? {
            CacheEntry::AccessToken(record) => Some(record),
            other => Self::mismatch(&other),
        }
    }

    /// Look up application metadata.
    pub async fn app_info(&self, key: &str) -> Option<AppMetadata> {
        match self.get(key).await? {
            CacheEntry::AppInfo(app) => Some(app),
            other => Self::mismatch(&other),
        }
    }

    /// Best-effort write. Failures are logged and swallowed.
    pub async fn put(&self, key: impl Into<String>, entry: CacheEntry) {
        let Some(backend) = &self.backend else {
            return;
        };
        let kind = entry.kind();
        if let Err(e) = backend.put(key.into(), entry).await {
            tracing::warn!(kind, error = %e, "Failed to populate credential cache");
        }
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.backend.as_ref()?.get(key).await
    }

    fn mismatch<T>(found: &CacheEntry) -> Option<T> {
        tracing::debug!(found = found.kind(), "Cache entry of unexpected kind treated as miss");
        None
    }
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache").field("enabled", &self.is_enabled()).finish()
    }
}
