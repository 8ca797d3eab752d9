//! Access token partitioning by user store domain.
//!
//! Deployments may split the access token table per user store. Mappings are
//! configured as `MAPPING:domain` pairs, e.g. `A:foo.com, B:bar.com`, and a
//! user `foo.com/alice` then has tokens in `IDN_OAUTH2_ACCESS_TOKEN_A`.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::defaults;
use crate::error::{OAuthError, OAuthResult};

/// Case-insensitive user store domain to partition mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainMappings {
    // keys are lowercased domains
    by_domain: HashMap<String, String>,
}

impl DomainMappings {
    /// Parse a `MAPPING:domain` list separated by commas.
    ///
    /// Blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an entry without both a mapping and
    /// a domain.
    pub fn parse(raw: &str) -> OAuthResult<Self> {
        let mut by_domain = HashMap::new();

        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.split(':').map(str::trim);
            let (Some(mapping), Some(domain)) = (parts.next(), parts.next()) else {
                return Err(OAuthError::configuration(format!(
                    "domain mapping '{entry}' is not defined correctly"
                )));
            };
            if mapping.is_empty() || domain.is_empty() {
                return Err(OAuthError::configuration(format!(
                    "domain mapping '{entry}' is not defined correctly"
                )));
            }
            by_domain.insert(domain.to_lowercase(), mapping.to_string());
        }

        tracing::debug!(mappings = by_domain.len(), "Parsed token partition domain mappings");
        Ok(Self { by_domain })
    }

    /// Partition mapped to `domain`, ignoring case.
    #[must_use]
    pub fn mapping_for(&self, domain: &str) -> Option<&str> {
        self.by_domain.get(&domain.to_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    /// User store domain of a `domain/name` user id, replaced by its mapping
    /// when one is configured.
    ///
    /// `None` when the id has no domain prefix.
    #[must_use]
    pub fn user_store_domain(&self, user_id: &str) -> Option<String> {
        let domain = domain_prefix(user_id)?;
        Some(self.mapping_for(domain).unwrap_or(domain).to_string())
    }

    /// Table holding the access tokens of `user_id`.
    #[must_use]
    pub fn token_store_table(&self, user_id: &str) -> String {
        match domain_prefix(user_id).and_then(|domain| self.mapping_for(domain)) {
            Some(mapping) => format!("{}_{mapping}", defaults::ACCESS_TOKEN_STORE_TABLE),
            None => defaults::ACCESS_TOKEN_STORE_TABLE.to_string(),
        }
    }

    /// [`Self::user_store_domain`] of the user encoded in an access token.
    #[must_use]
    pub fn user_store_domain_from_access_token(&self, access_token: &str) -> Option<String> {
        self.user_store_domain(&user_id_from_access_token(access_token)?)
    }

    /// [`Self::token_store_table`] for the user encoded in an access token.
    ///
    /// Tokens that carry no user resolve to the base table.
    #[must_use]
    pub fn token_store_table_from_access_token(&self, access_token: &str) -> String {
        user_id_from_access_token(access_token).map_or_else(
            || defaults::ACCESS_TOKEN_STORE_TABLE.to_string(),
            |user_id| self.token_store_table(&user_id),
        )
    }
}

/// User id carried by a partition-aware access token.
///
/// Such tokens are base64 of `consumer_key:user_id`. Returns `None` when the
/// token does not decode or has no user part.
#[must_use]
pub fn user_id_from_access_token(access_token: &str) -> Option<String> {
    let decoded = STANDARD.decode(access_token.trim()).ok()?;
    let decoded = String::from_utf8_lossy(&decoded);
    decoded.split(':').nth(1).map(str::to_string)
}

/// Cache key for an authorization code.
#[must_use]
pub fn authz_code_cache_key(client_id: &str, code: &str) -> String {
    format!("{client_id}:{code}")
}

fn domain_prefix(user_id: &str) -> Option<&str> {
    match user_id.split_once('/') {
        Some((domain, rest)) if !rest.is_empty() => Some(domain),
        _ => None,
    }
}
