//! OAuth 2.0 Credential Engine
//!
//! Client authentication and token lifecycle primitives for an OAuth 2.0
//! authorization server: client secret verification, PKCE (RFC 7636), token
//! validity with clock skew, scope hashing and cache-aside lookups.
//!
//! # Features
//!
//! - **Cache-aside**: moka-backed cache in front of pluggable async stores
//! - **Constant-time**: secret and PKCE comparisons via `subtle`
//! - **Explicit context**: request state is passed as values, never stored globally
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use oauth_credentials::{CredentialCache, config::Config, oauth::ClientAuthenticator, store::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = InMemoryStore::new();
//!     store.register_client("client-a", "secret-a", "alice").await;
//!
//!     let authenticator = ClientAuthenticator::new(Arc::new(store), CredentialCache::from_config(&config));
//!     assert!(authenticator.authenticate("client-a", "secret-a").await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod oauth;
pub mod store;

pub use cache::{CacheEntry, CacheService, CredentialCache};
pub use config::Config;
pub use error::{OAuthError, OAuthResult, PkceError, StoreError};
