//! Fully qualified usernames.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::error::{OAuthError, OAuthResult};

/// A user split into name, user store domain and tenant domain.
///
/// Parsed from the qualified form `DOMAIN/name@tenant`, where both the domain
/// prefix and the tenant suffix are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Name without domain or tenant.
    pub username: String,
    /// Tenant the user belongs to.
    pub tenant_domain: String,
    /// User store domain, upper case.
    pub user_store_domain: String,
}

impl AuthenticatedUser {
    /// Parse a qualified username.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank username.
    pub fn from_qualified_username(qualified: &str) -> OAuthResult<Self> {
        let qualified = qualified.trim();
        if qualified.is_empty() {
            return Err(OAuthError::invalid_argument(
                "username",
                "cannot create user from empty user name",
            ));
        }

        let (tenant_aware, tenant_domain) = match qualified.rsplit_once('@') {
            Some((name, tenant)) if !name.is_empty() && !tenant.is_empty() => (name, tenant),
            _ => (qualified, defaults::SUPER_TENANT_DOMAIN),
        };

        let (user_store_domain, username) = match tenant_aware.split_once('/') {
            Some((domain, name)) if !domain.is_empty() => (domain.to_uppercase(), name),
            _ => (defaults::PRIMARY_USER_STORE_DOMAIN.to_string(), tenant_aware),
        };

        Ok(Self {
            username: username.to_string(),
            tenant_domain: tenant_domain.to_string(),
            user_store_domain,
        })
    }

    /// The qualified form, `DOMAIN/name@tenant`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}/{}@{}", self.user_store_domain, self.username, self.tenant_domain)
    }
}
