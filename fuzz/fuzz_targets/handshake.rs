#![no_main]

//! Drives a TLS 1.2 client and server through a handshake and injects the
//! input at the handshake state selected by its first four bytes.

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let status = shakedown_harness::fuzz_one_input(data);
    assert!(status >= 0, "harness setup failed");
});
