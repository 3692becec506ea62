#![no_main]

use cnwallet_storage::PartialWalletDocument;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = PartialWalletDocument::from_bytes(data);
});
