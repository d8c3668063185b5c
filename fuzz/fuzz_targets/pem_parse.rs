#![no_main]

//! Feeds arbitrary bytes to the PEM loaders used for the server identity.

use libfuzzer_sys::fuzz_target;
use shakedown_transport::tls::{load_certs_from_pem, load_private_key_from_pem, ServerIdentity};

fuzz_target!(|data: &[u8]| {
    let certs = load_certs_from_pem(data);
    let key = load_private_key_from_pem(data);

    // Anything that parsed as both must be accepted or rejected cleanly.
    if certs.is_ok() && key.is_ok() {
        let _ = ServerIdentity::from_pem(data, data);
    }
});
