#![no_main]

use cnwallet_storage::decrypt;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary file images must fail cleanly, never panic
    let _ = decrypt(data, "fuzz");
});
