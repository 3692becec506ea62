//! Test doubles for the mnemonic seam

use crate::keys::SecretKey;
use crate::mnemonic::MnemonicDecoder;

const SEED_PREFIX: &str = "seed ";

/// Decodes phrases produced by [`FakeMnemonicDecoder::phrase_for`]
///
/// A phrase is `"seed "` followed by the hex spend key. Anything else is
/// rejected the way a real decoder rejects an unknown word.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeMnemonicDecoder;

impl FakeMnemonicDecoder {
    /// Create the decoder
    pub fn new() -> Self {
        Self
    }

    /// Phrase that decodes to `spend_key`
    pub fn phrase_for(spend_key: &SecretKey) -> String {
        format!("{}{}", SEED_PREFIX, spend_key.to_hex().as_str())
    }
}

impl MnemonicDecoder for FakeMnemonicDecoder {
    fn seed_to_private_key(&self, seed: &str) -> std::result::Result<SecretKey, String> {
        let words = seed
            .strip_prefix(SEED_PREFIX)
            .ok_or_else(|| "Mnemonic contains a word that is not in the word list".to_string())?;
        SecretKey::from_hex(words.trim()).ok_or_else(|| "Mnemonic checksum mismatch".to_string())
    }
}
