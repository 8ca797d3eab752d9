//! Backing store collaborators.
//!
//! The engine never talks to a database directly; it consumes these traits.
//! Every method answers `Ok(None)` for "not there" and reserves `Err` for
//! faults.

mod memory;

pub use memory::InMemoryStore;

use crate::error::StoreError;
use crate::models::{AccessTokenRecord, AppMetadata};

/// Client registrations.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Secret issued to `client_id`.
    async fn lookup_secret(&self, client_id: &str) -> Result<Option<String>, StoreError>;

    /// Username of the user owning the client, if the pair matches.
    async fn lookup_username(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Whether the user store holding `username` compares names case-sensitively.
    fn is_username_case_sensitive(&self, _username: &str) -> bool {
        true
    }
}

/// Issued tokens.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Record for a token identifier.
    async fn lookup_token(
        &self,
        token_identifier: &str,
    ) -> Result<Option<AccessTokenRecord>, StoreError>;
}

/// Registered applications.
#[async_trait::async_trait]
pub trait AppMetadataStore: Send + Sync {
    /// Metadata for the application registered under `client_id`.
    async fn lookup_app(&self, client_id: &str) -> Result<Option<AppMetadata>, StoreError>;
}
