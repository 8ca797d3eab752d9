//! Registered application metadata.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::oauth::pkce::PkcePolicy;

/// PKCE-relevant facts about a registered OAuth application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application client id.
    pub client_id: String,
    /// Display name.
    #[serde(default)]
    pub app_name: Option<String>,
    /// Every authorization code exchange must carry a verifier.
    #[serde(default)]
    pub pkce_mandatory: bool,
    /// The `plain` challenge method is accepted.
    #[serde(default)]
    pub pkce_support_plain: bool,
    /// Tenant domain of the application owner.
    #[serde(default)]
    pub owner_tenant_domain: Option<String>,
}

impl AppMetadata {
    /// Create metadata with PKCE optional and `plain` refused.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            app_name: None,
            pkce_mandatory: false,
            pkce_support_plain: false,
            owner_tenant_domain: None,
        }
    }

    /// PKCE policy for this application under the global PKCE switch.
    #[must_use]
    pub const fn pkce_policy(&self, pkce_enabled: bool) -> PkcePolicy {
        PkcePolicy {
            pkce_enabled,
            pkce_mandatory: self.pkce_mandatory,
            allow_plain: self.pkce_support_plain,
        }
    }

    /// Tenant domain of the owner, the super tenant when unknown.
    #[must_use]
    pub fn tenant_domain(&self) -> &str {
        self.owner_tenant_domain.as_deref().unwrap_or(defaults::SUPER_TENANT_DOMAIN)
    }
}
