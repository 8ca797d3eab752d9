#![no_main]

use libfuzzer_sys::fuzz_target;
use oauth_credentials::oauth::partition::{self, DomainMappings};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing either fails cleanly or yields usable mappings
    if let Ok(mappings) = DomainMappings::parse(input) {
        let _ = mappings.token_store_table(input);
        let _ = mappings.user_store_domain(input);
    }

    // Arbitrary bytes as an access token must not panic
    let _ = partition::user_id_from_access_token(input);
});
