//! Configuration for the credential engine.

use std::time::Duration;

use anyhow::Context;

use crate::error::OAuthResult;
use crate::oauth::partition::DomainMappings;

/// Default configuration values.
pub mod defaults {
    use std::time::Duration;

    /// Clock skew tolerated between issuing and validating parties (5 minutes).
    pub const TIMESTAMP_SKEW: Duration = Duration::from_secs(300);

    /// Cache TTL (15 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(900);

    /// Maximum number of cache entries.
    pub const CACHE_MAX_SIZE: u64 = 10_000;

    /// Base table holding access tokens.
    pub const ACCESS_TOKEN_STORE_TABLE: &str = "IDN_OAUTH2_ACCESS_TOKEN";

    /// Tenant domain used when none can be derived.
    pub const SUPER_TENANT_DOMAIN: &str = "carbon.super";

    /// User store domain used when a username carries none.
    pub const PRIMARY_USER_STORE_DOMAIN: &str = "PRIMARY";
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether the credential cache is used at all.
    pub cache_enabled: bool,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// Clock skew tolerance applied to token validity computations.
    pub timestamp_skew: Duration,

    /// Global PKCE support switch. When off, PKCE validation is a pass-through.
    pub pkce_enabled: bool,

    /// Whether access tokens are partitioned per user store domain.
    pub token_partitioning_enabled: bool,

    /// Partition mappings, e.g. `A:foo.com, B:bar.com`.
    pub token_partitioning_domains: Option<String>,
}

impl Config {
    /// Create a configuration with the given skew and defaults elsewhere.
    #[must_use]
    pub fn new(timestamp_skew: Duration) -> Self {
        Self {
            cache_enabled: true,
            cache_ttl: defaults::CACHE_TTL,
            cache_max_size: defaults::CACHE_MAX_SIZE,
            timestamp_skew,
            pkce_enabled: true,
            token_partitioning_enabled: false,
            token_partitioning_domains: None,
        }
    }

    /// Create a test configuration: zero skew, small cache.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl: Duration::from_secs(60),
            cache_max_size: 100,
            timestamp_skew: Duration::ZERO,
            pkce_enabled: true,
            token_partitioning_enabled: false,
            token_partitioning_domains: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset variables fall back to [`defaults`].
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<bool>("OAUTH_CACHE_ENABLED")? {
            config.cache_enabled = v;
        }
        if let Some(v) = env_parse::<u64>("OAUTH_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<u64>("OAUTH_CACHE_MAX_SIZE")? {
            config.cache_max_size = v;
        }
        if let Some(v) = env_parse::<u64>("OAUTH_TIMESTAMP_SKEW_SECS")? {
            config.timestamp_skew = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<bool>("OAUTH_PKCE_ENABLED")? {
            config.pkce_enabled = v;
        }
        if let Some(v) = env_parse::<bool>("OAUTH_TOKEN_PARTITIONING_ENABLED")? {
            config.token_partitioning_enabled = v;
        }
        config.token_partitioning_domains = std::env::var("OAUTH_TOKEN_PARTITIONING_DOMAINS").ok();

        Ok(config)
    }

    /// Parsed partition mappings, empty when partitioning is disabled.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the mapping string is malformed.
    pub fn domain_mappings(&self) -> OAuthResult<DomainMappings> {
        if !self.token_partitioning_enabled {
            return Ok(DomainMappings::default());
        }
        self.token_partitioning_domains
            .as_deref()
            .map_or_else(|| Ok(DomainMappings::default()), DomainMappings::parse)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(defaults::TIMESTAMP_SKEW)
    }
}

fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => {
            let value = raw.trim().parse::<T>().with_context(|| format!("invalid value for {name}"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
