//! PKCE (Proof Key for Code Exchange) verification.
//!
//! Implements RFC 7636 verifier/challenge validation for both the `plain`
//! and `S256` methods, plus the per-application policy that decides whether
//! PKCE is enforced for an exchange.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use regex::Regex;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::PkceError;

/// Minimum verifier length (RFC 7636 §4.1).
pub const MIN_VERIFIER_LEN: usize = 43;

/// Maximum verifier length (RFC 7636 §4.1).
pub const MAX_VERIFIER_LEN: usize = 128;

/// Length of a base64url, unpadded SHA-256 digest.
pub const S256_CHALLENGE_LEN: usize = 43;

static VERIFIER_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\-._~]+$").expect("verifier character class is a valid regex")
});

/// Code challenge transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PkceMethod {
    /// `code_challenge = code_verifier`.
    ///
    /// Also the fallback when the client sends no method.
    #[default]
    Plain,
    /// `code_challenge = BASE64URL(SHA256(code_verifier))`.
    S256,
}

impl PkceMethod {
    /// Parse a `code_challenge_method` wire value.
    ///
    /// Absent or blank falls back to `plain`. Matching is exact: `s256` and
    /// `" S256 "` are not `S256`.
    pub fn parse(method: Option<&str>) -> Result<Self, PkceError> {
        match method.filter(|m| !m.trim().is_empty()) {
            None | Some("plain") => Ok(Self::Plain),
            Some("S256") => Ok(Self::S256),
            Some(other) => Err(PkceError::unsupported_method(other)),
        }
    }

    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

impl std::fmt::Display for PkceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The challenge bound to an authorization code at issuance.
///
/// Consumed by value at exchange time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    /// Challenge as sent by the client.
    pub code_challenge: String,
    /// Transformation used.
    pub method: PkceMethod,
}

impl PkceChallenge {
    /// Validate authorization-request PKCE parameters and bind them.
    ///
    /// # Errors
    ///
    /// `UnsupportedMethod` for an unknown method, `InvalidChallenge` when the
    /// challenge does not fit its method.
    pub fn from_request(code_challenge: &str, method: Option<&str>) -> Result<Self, PkceError> {
        let parsed = PkceMethod::parse(method)?;
        if !is_valid_challenge(Some(code_challenge), Some(parsed.as_str())) {
            return Err(PkceError::InvalidChallenge);
        }
        Ok(Self { code_challenge: code_challenge.to_string(), method: parsed })
    }
}

/// Per-exchange PKCE policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkcePolicy {
    /// Global PKCE support switch.
    pub pkce_enabled: bool,
    /// The application requires a verifier on every exchange.
    pub pkce_mandatory: bool,
    /// The application accepts the `plain` method.
    pub allow_plain: bool,
}

impl Default for PkcePolicy {
    fn default() -> Self {
        Self { pkce_enabled: true, pkce_mandatory: false, allow_plain: false }
    }
}

/// Check a verifier against the RFC 7636 character set and length bounds.
#[must_use]
pub fn is_valid_verifier(verifier: &str) -> bool {
    (MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&verifier.len())
        && VERIFIER_CHARSET.is_match(verifier)
}

/// Check a challenge sent at authorization time.
///
/// `plain` (or no method) applies the verifier rules, `S256` requires exactly
/// 43 characters after trimming. Unknown methods are never valid.
#[must_use]
pub fn is_valid_challenge(challenge: Option<&str>, method: Option<&str>) -> bool {
    match method {
        None | Some("plain") => challenge.is_some_and(is_valid_verifier),
        Some("S256") => challenge.is_some_and(|c| c.trim().len() == S256_CHALLENGE_LEN),
        Some(_) => false,
    }
}

/// Compute the S256 challenge for a verifier.
#[must_use]
pub fn compute_s256_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash).trim().to_string()
}

/// Verify a token request's verifier against the challenge stored with the code.
///
/// Returns `Ok(false)` for a verifier that simply does not match; policy
/// violations are errors.
pub fn verify(
    reference_challenge: Option<&str>,
    verifier: Option<&str>,
    method: Option<&str>,
    policy: &PkcePolicy,
) -> Result<bool, PkceError> {
    if !policy.pkce_enabled {
        return Ok(true);
    }

    if !policy.pkce_mandatory && reference_challenge.is_none() {
        return Ok(true);
    }

    let verifier = match verifier.filter(|v| !v.trim().is_empty()) {
        Some(v) => v,
        None if policy.pkce_mandatory => return Err(PkceError::MissingVerifier),
        None if reference_challenge.is_none_or(|c| c.trim().is_empty()) => return Ok(true),
        None => return Err(PkceError::VerifierRequired),
    };

    if !is_valid_verifier(verifier) {
        return Err(PkceError::MalformedVerifier);
    }

    let reference = reference_challenge.unwrap_or_default();

    match PkceMethod::parse(method)? {
        PkceMethod::Plain => {
            if !policy.allow_plain {
                return Err(PkceError::PlainNotAllowed);
            }
            Ok(constant_time_eq(reference, verifier))
        }
        PkceMethod::S256 => Ok(constant_time_eq(reference, &compute_s256_challenge(verifier))),
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7636 Appendix B test vector
    const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    const CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    fn plain_policy() -> PkcePolicy {
        PkcePolicy { allow_plain: true, ..PkcePolicy::default() }
    }

    #[test]
    fn test_s256_rfc_vector() {
        assert_eq!(compute_s256_challenge(VERIFIER), CHALLENGE);
        assert_eq!(
            verify(Some(CHALLENGE), Some(VERIFIER), Some("S256"), &PkcePolicy::default()),
            Ok(true)
        );
    }

    #[test]
    fn test_s256_wrong_verifier_is_negative_not_error() {
        let wrong = format!("{VERIFIER}x");
        assert_eq!(
            verify(Some(CHALLENGE), Some(&wrong), Some("S256"), &PkcePolicy::default()),
            Ok(false)
        );
    }

    #[test]
    fn test_verifier_bounds() {
        assert!(is_valid_verifier(&"a".repeat(43)));
        assert!(is_valid_verifier(&"a".repeat(128)));
        assert!(!is_valid_verifier(&"a".repeat(42)));
        assert!(!is_valid_verifier(&"a".repeat(129)));
        assert!(!is_valid_verifier(""));
    }

    #[test]
    fn test_verifier_charset() {
        assert!(is_valid_verifier(&format!("{}-._~", "A1z".repeat(14))));
        assert!(!is_valid_verifier(&format!("{}!", "a".repeat(43))));
        assert!(!is_valid_verifier(&format!("{} ", "a".repeat(43))));
        assert!(!is_valid_verifier(&format!("{}é", "a".repeat(43))));
    }

    #[test]
    fn test_challenge_validation() {
        assert!(is_valid_challenge(Some(VERIFIER), None));
        assert!(is_valid_challenge(Some(VERIFIER), Some("plain")));
        assert!(is_valid_challenge(Some(CHALLENGE), Some("S256")));
        assert!(is_valid_challenge(Some(&format!(" {CHALLENGE} ")), Some("S256")));
        assert!(!is_valid_challenge(Some("short"), Some("S256")));
        assert!(!is_valid_challenge(None, Some("S256")));
        assert!(!is_valid_challenge(Some(CHALLENGE), Some("S512")));
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PkceMethod::parse(None), Ok(PkceMethod::Plain));
        assert_eq!(PkceMethod::parse(Some("  ")), Ok(PkceMethod::Plain));
        assert_eq!(PkceMethod::parse(Some("S256")), Ok(PkceMethod::S256));
        assert_eq!(PkceMethod::parse(Some("s256")), Err(PkceError::unsupported_method("s256")));
        assert_eq!(PkceMethod::parse(Some(" S256 ")), Err(PkceError::unsupported_method(" S256 ")));
        assert_eq!(PkceMethod::parse(Some("plain ")), Err(PkceError::unsupported_method("plain ")));
    }

    #[test]
    fn test_disabled_pkce_passes_everything() {
        let policy = PkcePolicy { pkce_enabled: false, pkce_mandatory: true, allow_plain: false };
        assert_eq!(verify(Some(CHALLENGE), None, Some("bogus"), &policy), Ok(true));
    }

    #[test]
    fn test_optional_without_challenge_passes() {
        assert_eq!(verify(None, None, None, &PkcePolicy::default()), Ok(true));
        assert_eq!(verify(None, Some("!!"), Some("S256"), &PkcePolicy::default()), Ok(true));
    }

    #[test]
    fn test_missing_verifier() {
        let mandatory = PkcePolicy { pkce_mandatory: true, ..PkcePolicy::default() };
        assert_eq!(
            verify(Some(CHALLENGE), None, Some("S256"), &mandatory),
            Err(PkceError::MissingVerifier)
        );
        assert_eq!(
            verify(Some(CHALLENGE), Some("   "), Some("S256"), &PkcePolicy::default()),
            Err(PkceError::VerifierRequired)
        );
        assert_eq!(verify(Some(" "), None, None, &PkcePolicy::default()), Ok(true));
    }

    #[test]
    fn test_malformed_verifier() {
        assert_eq!(
            verify(Some(CHALLENGE), Some("too-short"), Some("S256"), &PkcePolicy::default()),
            Err(PkceError::MalformedVerifier)
        );
    }

    #[test]
    fn test_plain_method() {
        assert_eq!(verify(Some(VERIFIER), Some(VERIFIER), None, &plain_policy()), Ok(true));
        assert_eq!(
            verify(Some(VERIFIER), Some(&"b".repeat(43)), Some("plain"), &plain_policy()),
            Ok(false)
        );
        assert_eq!(
            verify(Some(VERIFIER), Some(VERIFIER), Some("plain"), &PkcePolicy::default()),
            Err(PkceError::PlainNotAllowed)
        );
    }

    #[test]
    fn test_unsupported_method() {
        assert_eq!(
            verify(Some(CHALLENGE), Some(VERIFIER), Some("S512"), &PkcePolicy::default()),
            Err(PkceError::unsupported_method("S512"))
        );
    }

    #[test]
    fn test_challenge_from_request() {
        let bound = PkceChallenge::from_request(CHALLENGE, Some("S256")).unwrap();
        assert_eq!(bound.method, PkceMethod::S256);

        assert_eq!(
            PkceChallenge::from_request("short", Some("S256")),
            Err(PkceError::InvalidChallenge)
        );
        assert_eq!(
            PkceChallenge::from_request(CHALLENGE, Some("md5")),
            Err(PkceError::unsupported_method("md5"))
        );
        assert_eq!(PkceChallenge::from_request(VERIFIER, None).unwrap().method, PkceMethod::Plain);
    }
}
