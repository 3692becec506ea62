//! Password-encrypted wallet container
//!
//! `IS_A_WALLET_IDENTIFIER || salt || AES-256-CBC(IS_CORRECT_PASSWORD_IDENTIFIER || payload)`

use crate::security::{generate_salt, CbcError, FileKey};
use cnwallet_core::{Result, WalletError};
use cnwallet_params::{IS_A_WALLET_IDENTIFIER, IS_CORRECT_PASSWORD_IDENTIFIER, SALT_SIZE};
use tracing::debug;
use zeroize::Zeroizing;

/// Check that `data` starts with `identifier` and return the rest
///
/// Input shorter than the identifier fails with `too_small`, a differing
/// prefix with `wrong_identifier`.
pub fn strip_magic_identifier<'a>(
    data: &'a [u8],
    identifier: &[u8],
    too_small: WalletError,
    wrong_identifier: WalletError,
) -> Result<&'a [u8]> {
    if data.len() < identifier.len() {
        return Err(too_small);
    }

    let (prefix, rest) = data.split_at(identifier.len());
    if prefix != identifier {
        return Err(wrong_identifier);
    }

    Ok(rest)
}

/// Encrypt `payload` into a wallet file image with a fresh random salt
pub fn encrypt(payload: &[u8], password: &str) -> Vec<u8> {
    encrypt_with_salt(payload, password, &generate_salt())
}

/// Encrypt `payload` with a caller-chosen salt
pub fn encrypt_with_salt(payload: &[u8], password: &str, salt: &[u8; SALT_SIZE]) -> Vec<u8> {
    let key = FileKey::derive(password, salt);

    let mut plaintext =
        Zeroizing::new(Vec::with_capacity(IS_CORRECT_PASSWORD_IDENTIFIER.len() + payload.len()));
    plaintext.extend_from_slice(&IS_CORRECT_PASSWORD_IDENTIFIER);
    plaintext.extend_from_slice(payload);

    let ciphertext = key.encrypt_cbc(salt, &plaintext);

    let mut out = Vec::with_capacity(IS_A_WALLET_IDENTIFIER.len() + SALT_SIZE + ciphertext.len());
    out.extend_from_slice(&IS_A_WALLET_IDENTIFIER);
    out.extend_from_slice(salt);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt a wallet file image and return the payload
///
/// # Errors
/// - `NotAWalletFile`: missing or short file identifier
/// - `WalletFileCorrupted`: truncated salt, bad ciphertext length, or a
///   plaintext too short to hold the password identifier
/// - `WrongPassword`: bad padding or password identifier mismatch
pub fn decrypt(data: &[u8], password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let rest = strip_magic_identifier(
        data,
        &IS_A_WALLET_IDENTIFIER,
        WalletError::NotAWalletFile,
        WalletError::NotAWalletFile,
    )?;

    if rest.len() < SALT_SIZE {
        debug!("Wallet file ends inside the salt ({} bytes)", rest.len());
        return Err(WalletError::WalletFileCorrupted);
    }
    let (salt_bytes, ciphertext) = rest.split_at(SALT_SIZE);
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(salt_bytes);

    let key = FileKey::derive(password, &salt);
    let plaintext = key.decrypt_cbc(&salt, ciphertext).map_err(|e| {
        debug!("Wallet file decryption failed: {}", e);
        match e {
            CbcError::BlockLength => WalletError::WalletFileCorrupted,
            CbcError::Padding => WalletError::WrongPassword,
        }
    })?;

    let payload = strip_magic_identifier(
        &plaintext,
        &IS_CORRECT_PASSWORD_IDENTIFIER,
        WalletError::WalletFileCorrupted,
        WalletError::WrongPassword,
    )?;

    Ok(Zeroizing::new(payload.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_magic_identifier() {
        let too_small = WalletError::NotAWalletFile;
        let wrong = WalletError::WrongPassword;

        assert_eq!(strip_magic_identifier(b"abcdef", b"abc", too_small, wrong), Ok(&b"def"[..]));
        assert_eq!(strip_magic_identifier(b"abc", b"abc", too_small, wrong), Ok(&b""[..]));
        assert_eq!(strip_magic_identifier(b"ab", b"abc", too_small, wrong), Err(too_small));
        assert_eq!(strip_magic_identifier(b"abd", b"abc", too_small, wrong), Err(wrong));
    }

    #[test]
    fn test_layout() {
        let salt = [9u8; SALT_SIZE];
        let image = encrypt_with_salt(b"{}", "pw", &salt);
        let header = IS_A_WALLET_IDENTIFIER.len();

        assert_eq!(&image[..header], &IS_A_WALLET_IDENTIFIER);
        assert_eq!(&image[header..header + SALT_SIZE], &salt);
        assert_eq!((image.len() - header - SALT_SIZE) % 16, 0);
    }

    #[test]
    fn test_round_trip() {
        let image = encrypt(b"{\"a\":1}", "pw");
        assert_eq!(decrypt(&image, "pw").unwrap().as_slice(), b"{\"a\":1}");
    }

    #[test]
    fn test_salt_only_file_is_corrupted() {
        let mut image = IS_A_WALLET_IDENTIFIER.to_vec();
        image.extend_from_slice(&[0u8; SALT_SIZE]);
        assert_eq!(decrypt(&image, "pw").unwrap_err(), WalletError::WalletFileCorrupted);
    }
}
