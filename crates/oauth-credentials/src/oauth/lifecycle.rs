//! Access and refresh token validity windows.
//!
//! Every computation adds the configured clock skew to "now" so a token that
//! is about to expire on another node is already treated as expired here.
//! Windows of one second or less are reported as expired: they are too short
//! to hand to a client.

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::Config;
use crate::error::{OAuthError, OAuthResult};
use crate::models::AccessTokenRecord;

/// Windows at or below this many milliseconds count as expired.
const MIN_USEFUL_VALIDITY_MS: i64 = 1000;

/// Remaining lifetime of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// The token never expires.
    Infinite,
    /// Time left; zero means expired.
    Finite(TimeDelta),
}

impl Remaining {
    /// An expired window.
    #[must_use]
    pub fn expired() -> Self {
        Self::Finite(TimeDelta::zero())
    }

    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Whether no usable time is left.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Finite(d) if *d <= TimeDelta::zero())
    }

    /// Time left, `None` when infinite.
    #[must_use]
    pub const fn duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Infinite => None,
            Self::Finite(d) => Some(*d),
        }
    }

    /// Milliseconds left, `-1` for an infinite lifetime.
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.duration().map_or(-1, |d| d.num_milliseconds())
    }
}

/// Computes token validity with a fixed clock skew.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifecycleCalculator {
    skew_ms: i64,
}

impl TokenLifecycleCalculator {
    /// Create a calculator tolerating `skew` of clock drift.
    #[must_use]
    pub fn new(skew: TimeDelta) -> Self {
        Self { skew_ms: skew.num_milliseconds() }
    }

    /// Create a calculator from the configured timestamp skew.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the skew does not fit a `TimeDelta`.
    pub fn from_config(config: &Config) -> OAuthResult<Self> {
        let skew = TimeDelta::from_std(config.timestamp_skew)
            .map_err(|e| OAuthError::configuration(format!("invalid timestamp skew: {e}")))?;
        Ok(Self::new(skew))
    }

    /// Configured skew.
    #[must_use]
    pub fn skew(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.skew_ms)
    }

    /// Time left on the access token.
    ///
    /// Also expired when the refresh window has one second or less left. The
    /// refresh window is always computed from the record, so a negative
    /// refresh period expires the access token here even though
    /// [`Self::remaining_refresh_validity`] reports it as infinite.
    pub fn remaining_access_validity(
        &self,
        record: &AccessTokenRecord,
        now: DateTime<Utc>,
    ) -> OAuthResult<Remaining> {
        if record.has_infinite_access_lifetime() {
            tracing::debug!(consumer_key = %record.consumer_key, "Access token has infinite lifetime");
            return Ok(Remaining::Infinite);
        }

        let reference = self.shifted_now(now, self.skew_ms)?;
        let access = window(record.issued_at, record.validity_period, reference)?;

        let refresh =
            window(record.refresh_token_issued_at, record.refresh_validity_period, reference)?;

        if access > MIN_USEFUL_VALIDITY_MS && refresh > MIN_USEFUL_VALIDITY_MS {
            return Ok(Remaining::Finite(TimeDelta::milliseconds(access)));
        }
        Ok(Remaining::expired())
    }

    /// Time left on the refresh token.
    pub fn remaining_refresh_validity(
        &self,
        record: &AccessTokenRecord,
        now: DateTime<Utc>,
    ) -> OAuthResult<Remaining> {
        if record.has_infinite_refresh_lifetime() {
            tracing::debug!(consumer_key = %record.consumer_key, "Refresh token has infinite lifetime");
            return Ok(Remaining::Infinite);
        }

        let reference = self.shifted_now(now, self.skew_ms)?;
        let refresh =
            window(record.refresh_token_issued_at, record.refresh_validity_period, reference)?;
        Ok(clamp(refresh))
    }

    /// Access token expiry with the skew granted as grace.
    ///
    /// Unlike [`Self::remaining_access_validity`] this ignores the refresh
    /// token and compares against `now - skew`.
    pub fn access_token_expiry(
        &self,
        record: &AccessTokenRecord,
        now: DateTime<Utc>,
    ) -> OAuthResult<Remaining> {
        if record.has_infinite_access_lifetime() {
            return Ok(Remaining::Infinite);
        }

        let reference = self.shifted_now(now, -self.skew_ms)?;
        let access = window(record.issued_at, record.validity_period, reference)?;
        Ok(clamp(access))
    }

    /// Re-base a cached token record on `now`.
    ///
    /// Returns `None` when the record is no longer worth serving. Otherwise
    /// the copy has `issued_at = now` and a validity period equal to the time
    /// it had left. Infinite records are returned unchanged.
    pub fn try_extend(
        &self,
        record: &AccessTokenRecord,
        now: DateTime<Utc>,
    ) -> OAuthResult<Option<AccessTokenRecord>> {
        match self.remaining_access_validity(record, now)? {
            Remaining::Infinite => Ok(Some(record.clone())),
            Remaining::Finite(left) if left > TimeDelta::zero() => Ok(Some(AccessTokenRecord {
                issued_at: now,
                validity_period: left,
                ..record.clone()
            })),
            Remaining::Finite(_) => Ok(None),
        }
    }

    fn shifted_now(&self, now: DateTime<Utc>, shift_ms: i64) -> OAuthResult<i64> {
        now.timestamp_millis()
            .checked_add(shift_ms)
            .ok_or_else(|| OAuthError::invalid_argument("now", "timestamp overflow"))
    }
}

/// `issued_at + period - reference`, in milliseconds.
fn window(issued_at: DateTime<Utc>, period: TimeDelta, reference_ms: i64) -> OAuthResult<i64> {
    issued_at
        .timestamp_millis()
        .checked_add(period.num_milliseconds())
        .and_then(|expiry| expiry.checked_sub(reference_ms))
        .ok_or_else(|| OAuthError::invalid_argument("record", "validity window overflows"))
}

fn clamp(ms: i64) -> Remaining {
    if ms > MIN_USEFUL_VALIDITY_MS {
        Remaining::Finite(TimeDelta::milliseconds(ms))
    } else {
        Remaining::expired()
    }
}
