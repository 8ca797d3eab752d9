//! Fuzzing library for oauth-credentials.
//!
//! Fuzz targets cover the parsers that see untrusted input: PKCE verifiers
//! and challenge methods, scope strings, and partition-aware access tokens.
//!
//! # Usage
//!
//! ```bash
//! cd crates/oauth-credentials-fuzz
//! cargo +nightly fuzz run fuzz_pkce_verify -- -max_total_time=60
//! ```

pub use oauth_credentials::oauth::{partition, pkce, scope};
