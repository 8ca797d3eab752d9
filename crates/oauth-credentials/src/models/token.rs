//! Access token records as held by the token store.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an issued access token and its refresh token.
///
/// A negative validity period means the token never expires.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRecord {
    /// Access token identifier.
    pub token_identifier: String,
    /// Client the token was issued to.
    pub consumer_key: String,
    /// When the access token was issued.
    pub issued_at: DateTime<Utc>,
    /// Access token lifetime.
    #[serde(with = "millis")]
    pub validity_period: TimeDelta,
    /// When the refresh token was issued.
    pub refresh_token_issued_at: DateTime<Utc>,
    /// Refresh token lifetime.
    #[serde(with = "millis")]
    pub refresh_validity_period: TimeDelta,
}

impl AccessTokenRecord {
    /// Create a record whose refresh token was issued together with the access token.
    pub fn new(
        token_identifier: impl Into<String>,
        consumer_key: impl Into<String>,
        issued_at: DateTime<Utc>,
        validity_period: TimeDelta,
        refresh_validity_period: TimeDelta,
    ) -> Self {
        Self {
            token_identifier: token_identifier.into(),
            consumer_key: consumer_key.into(),
            issued_at,
            validity_period,
            refresh_token_issued_at: issued_at,
            refresh_validity_period,
        }
    }

    /// Override the refresh token issue time.
    #[must_use]
    pub fn with_refresh_issued_at(mut self, refresh_token_issued_at: DateTime<Utc>) -> Self {
        self.refresh_token_issued_at = refresh_token_issued_at;
        self
    }

    /// Whether the access token has an infinite lifetime.
    #[must_use]
    pub fn has_infinite_access_lifetime(&self) -> bool {
        self.validity_period < TimeDelta::zero()
    }

    /// Whether the refresh token has an infinite lifetime.
    #[must_use]
    pub fn has_infinite_refresh_lifetime(&self) -> bool {
        self.refresh_validity_period < TimeDelta::zero()
    }
}

impl std::fmt::Debug for AccessTokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenRecord")
            .field("token_identifier", &"[REDACTED]")
            .field("consumer_key", &self.consumer_key)
            .field("issued_at", &self.issued_at)
            .field("validity_period", &self.validity_period)
            .field("refresh_token_issued_at", &self.refresh_token_issued_at)
            .field("refresh_validity_period", &self.refresh_validity_period)
            .finish()
    }
}

/// Serialize a `TimeDelta` as whole milliseconds.
mod millis {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let ms = i64::deserialize(deserializer)?;
        TimeDelta::try_milliseconds(ms)
            .ok_or_else(|| D::Error::custom(format!("duration out of range: {ms}ms")))
    }
}
