//! Shared test doubles.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use oauth_credentials::StoreError;
use oauth_credentials::models::{AccessTokenRecord, AppMetadata};
use oauth_credentials::store::{AppMetadataStore, CredentialStore, InMemoryStore, TokenStore};

/// In-memory store that counts every backing call.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: InMemoryStore,
    pub secret_lookups: AtomicUsize,
    pub username_lookups: AtomicUsize,
    pub token_lookups: AtomicUsize,
    pub app_lookups: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Arc<Self> {
        Arc::new(Self { inner, ..Self::default() })
    }

    pub fn secret_lookups(&self) -> usize {
        self.secret_lookups.load(Ordering::SeqCst)
    }

    pub fn username_lookups(&self) -> usize {
        self.username_lookups.load(Ordering::SeqCst)
    }

    pub fn token_lookups(&self) -> usize {
        self.token_lookups.load(Ordering::SeqCst)
    }

    pub fn app_lookups(&self) -> usize {
        self.app_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CredentialStore for CountingStore {
    async fn lookup_secret(&self, client_id: &str) -> Result<Option<String>, StoreError> {
        self.secret_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup_secret(client_id).await
    }

    async fn lookup_username(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Option<String>, StoreError> {
        self.username_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup_username(client_id, client_secret).await
    }

    fn is_username_case_sensitive(&self, username: &str) -> bool {
        self.inner.is_username_case_sensitive(username)
    }
}

#[async_trait::async_trait]
impl TokenStore for CountingStore {
    async fn lookup_token(
        &self,
        token_identifier: &str,
    ) -> Result<Option<AccessTokenRecord>, StoreError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup_token(token_identifier).await
    }
}

#[async_trait::async_trait]
impl AppMetadataStore for CountingStore {
    async fn lookup_app(&self, client_id: &str) -> Result<Option<AppMetadata>, StoreError> {
        self.app_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup_app(client_id).await
    }
}

/// Store whose every call fails as unreachable.
#[derive(Debug, Default)]
pub struct DownStore;

#[async_trait::async_trait]
impl CredentialStore for DownStore {
    async fn lookup_secret(&self, _client_id: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn lookup_username(
        &self,
        _client_id: &str,
        _client_secret: &str,
    ) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }
}

#[async_trait::async_trait]
impl TokenStore for DownStore {
    async fn lookup_token(
        &self,
        _token_identifier: &str,
    ) -> Result<Option<AccessTokenRecord>, StoreError> {
        Err(StoreError::backend("relation does not exist"))
    }
}
