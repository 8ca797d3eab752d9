#![no_main]

use libfuzzer_sys::fuzz_target;
use oauth_credentials::oauth::scope;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = scope::parse(Some(input));
    let canonical = scope::canonicalize(Some(parsed.as_slice()));
    let reparsed = scope::parse(canonical.as_deref());
    assert_eq!(scope::canonicalize(Some(reparsed.as_slice())), canonical);
    assert_eq!(scope::hash_scope_string(Some(input)), scope::hash(Some(parsed.as_slice())));
});
