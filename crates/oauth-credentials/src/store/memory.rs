//! In-memory store implementing every collaborator trait.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{AppMetadataStore, CredentialStore, TokenStore};
use crate::error::StoreError;
use crate::models::{AccessTokenRecord, AppMetadata};

struct ClientRow {
    secret: String,
    owner: String,
}

/// In-memory client, token and application registry.
#[derive(Clone)]
pub struct InMemoryStore {
    clients: Arc<RwLock<HashMap<String, ClientRow>>>,
    tokens: Arc<RwLock<HashMap<String, AccessTokenRecord>>>,
    apps: Arc<RwLock<HashMap<String, AppMetadata>>>,
    case_sensitive_usernames: bool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(HashMap::new())),
            apps: Arc::new(RwLock::new(HashMap::new())),
            case_sensitive_usernames: true,
        }
    }

    /// Treat every username as case-insensitive.
    #[must_use]
    pub fn with_case_insensitive_usernames(mut self) -> Self {
        self.case_sensitive_usernames = false;
        self
    }

    /// Register a client with its secret and owning user.
    pub async fn register_client(
        &self,
        client_id: impl Into<String>,
        secret: impl Into<String>,
        owner: impl Into<String>,
    ) {
        self.clients
            .write()
            .await
            .insert(client_id.into(), ClientRow { secret: secret.into(), owner: owner.into() });
    }

    /// Store a token record under its identifier.
    pub async fn insert_token(&self, record: AccessTokenRecord) {
        self.tokens.write().await.insert(record.token_identifier.clone(), record);
    }

    /// Register application metadata.
    pub async fn register_app(&self, app: AppMetadata) {
        self.apps.write().await.insert(app.client_id.clone(), app);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("case_sensitive_usernames", &self.case_sensitive_usernames)
            .finish()
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryStore {
    async fn lookup_secret(&self, client_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.clients.read().await.get(client_id).map(|row| row.secret.clone()))
    }

    async fn lookup_username(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Option<String>, StoreError> {
        let clients = self.clients.read().await;
        Ok(clients
            .get(client_id)
            .filter(|row| row.secret == client_secret)
            .map(|row| row.owner.clone()))
    }

    fn is_username_case_sensitive(&self, _username: &str) -> bool {
        self.case_sensitive_usernames
    }
}

#[async_trait::async_trait]
impl TokenStore for InMemoryStore {
    async fn lookup_token(
        &self,
        token_identifier: &str,
    ) -> Result<Option<AccessTokenRecord>, StoreError> {
        Ok(self.tokens.read().await.get(token_identifier).cloned())
    }
}

#[async_trait::async_trait]
impl AppMetadataStore for InMemoryStore {
    async fn lookup_app(&self, client_id: &str) -> Result<Option<AppMetadata>, StoreError> {
        Ok(self.apps.read().await.get(client_id).cloned())
    }
}
