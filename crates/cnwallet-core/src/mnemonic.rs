//! Mnemonic seed conversion seam
//!
//! Wordlists and seed checksums live outside this crate; wallet import only
//! needs the spend key a seed phrase decodes to.

use crate::keys::SecretKey;

/// Converts a mnemonic seed phrase into a private spend key
pub trait MnemonicDecoder: Send + Sync {
    /// Decode `seed`, returning a human-readable reason on failure
    fn seed_to_private_key(&self, seed: &str) -> std::result::Result<SecretKey, String>;
}
