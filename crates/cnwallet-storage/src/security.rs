//! Security primitives for the wallet file
//!
//! PBKDF2-HMAC-SHA256 key derivation and AES-256-CBC with PKCS#7 padding.
//! Derived keys and decrypted buffers are zeroized on drop.

use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cnwallet_params::{KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// CBC decryption failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CbcError {
    /// Ciphertext is empty or not a whole number of blocks
    #[error("ciphertext length is not a positive multiple of the block size")]
    BlockLength,
    /// PKCS#7 padding did not check out after decryption
    #[error("invalid padding")]
    Padding,
}

/// AES-256 key derived from the wallet password
pub struct FileKey {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl FileKey {
    /// Derive the file key from a password and salt
    pub fn derive(password: &str, salt: &[u8; SALT_SIZE]) -> Self {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..]);
        Self { key }
    }

    /// Get key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Encrypt with PKCS#7 padding. Output is always a non-empty multiple of
    /// [`BLOCK_SIZE`].
    pub fn encrypt_cbc(&self, iv: &[u8; SALT_SIZE], plaintext: &[u8]) -> Vec<u8> {
        let key: &[u8; KEY_SIZE] = &self.key;
        Aes256CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypt and unpad
    pub fn decrypt_cbc(
        &self,
        iv: &[u8; SALT_SIZE],
        ciphertext: &[u8],
    ) -> std::result::Result<Zeroizing<Vec<u8>>, CbcError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CbcError::BlockLength);
        }

        let key: &[u8; KEY_SIZE] = &self.key;
        Aes256CbcDec::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| CbcError::Padding)
    }
}

/// Generate a fresh random salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}
