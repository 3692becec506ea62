//! Constants of the encrypted wallet file format
//!
//! File layout: `IS_A_WALLET_IDENTIFIER || salt || AES-256-CBC(IS_CORRECT_PASSWORD_IDENTIFIER || document)`.

/// Unencrypted prefix identifying a wallet file.
pub const IS_A_WALLET_IDENTIFIER: [u8; 28] = *b"cnwallet: encrypted wallet\x00\x01";

/// Prefix of the decrypted plaintext; a mismatch means the password was wrong.
pub const IS_CORRECT_PASSWORD_IDENTIFIER: [u8; 28] = *b"cnwallet: password accepted\x01";

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 500_000;

/// Salt size in bytes. The salt doubles as the CBC IV.
pub const SALT_SIZE: usize = 16;

/// Derived AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Version number written into serialized wallet documents.
pub const WALLET_FILE_FORMAT_VERSION: u32 = 0;
