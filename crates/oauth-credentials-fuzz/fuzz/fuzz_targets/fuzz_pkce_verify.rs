#![no_main]

use libfuzzer_sys::fuzz_target;
use oauth_credentials::oauth::PkcePolicy;
use oauth_credentials::oauth::pkce;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // verifier | method, challenge derived from the verifier
    let (verifier, method) = input.split_once('|').unwrap_or((input, "S256"));
    let challenge = pkce::compute_s256_challenge(verifier);
    let policy = PkcePolicy { allow_plain: true, ..PkcePolicy::default() };

    let result = pkce::verify(Some(&challenge), Some(verifier), Some(method), &policy);
    if method == "S256" && pkce::is_valid_verifier(verifier) {
        assert_eq!(result, Ok(true));
    }
    if result == Ok(true) && !verifier.trim().is_empty() {
        assert!(pkce::is_valid_verifier(verifier));
    }
});
