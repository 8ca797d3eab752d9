//! Scope canonicalization and hashing.
//!
//! The canonical form of a scope list is its tokens sorted lexicographically
//! and joined by single spaces. Duplicates are kept so hashes stay equal to
//! the ones already stored by existing deployments.

use md5::{Digest, Md5};

/// Scope that turns an authorization request into an OpenID Connect request.
pub const OPENID_SCOPE: &str = "openid";

/// Canonical string for a scope list.
///
/// `None` means "no scopes were specified" and stays `None`; an empty list
/// canonicalizes to the empty string.
#[must_use]
pub fn canonicalize<S: AsRef<str>>(scopes: Option<&[S]>) -> Option<String> {
    let scopes = scopes?;
    let mut tokens: Vec<&str> = scopes.iter().flat_map(|s| s.as_ref().split_whitespace()).collect();
    tokens.sort_unstable();
    Some(tokens.join(" "))
}

/// Split a space-delimited scope string.
///
/// Blank or absent input gives an empty list, never `None`.
#[must_use]
pub fn parse(scope: Option<&str>) -> Vec<String> {
    scope.map(|s| s.split_whitespace().map(str::to_string).collect()).unwrap_or_default()
}

/// MD5 of the canonical scope string, lowercase hex.
///
/// Not a security primitive: the digest only keys caches and token indexes
/// that were built with it.
#[must_use]
pub fn hash<S: AsRef<str>>(scopes: Option<&[S]>) -> Option<String> {
    canonicalize(scopes).map(|canonical| md5_hex(&canonical))
}

/// [`hash`] for a scope string as received on the wire.
#[must_use]
pub fn hash_scope_string(scope: Option<&str>) -> Option<String> {
    let scope = scope?;
    hash(Some(parse(Some(scope)).as_slice()))
}

/// Whether the requested scopes make this an OpenID Connect request.
#[must_use]
pub fn is_oidc_request<S: AsRef<str>>(scopes: &[S]) -> bool {
    scopes.iter().any(|s| s.as_ref() == OPENID_SCOPE)
}

fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}
