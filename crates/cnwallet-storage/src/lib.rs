//! Encrypted wallet file storage
//!
//! Provides the password-encrypted wallet container, the serialized wallet
//! document it carries, and atomic wallet file IO.
//!
//! ## File format
//!
//! - **Identifier**: fixed unencrypted prefix marking the file as a wallet
//! - **Salt**: 16 random bytes, fresh on every save, also used as the CBC IV
//! - **KDF**: PBKDF2-HMAC-SHA256, 500 000 iterations, 32-byte key
//! - **Cipher**: AES-256-CBC with PKCS#7 padding over a password-check
//!   identifier followed by the JSON wallet document
//!
//! There is no MAC. A wrong password is detected through the padding and the
//! password-check identifier only.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod container;
pub mod document;
pub mod security;
pub mod wallet_file;

pub use container::{decrypt, encrypt, encrypt_with_salt, strip_magic_identifier};
pub use document::{PartialWalletDocument, RestoredWallet, SynchronizerState, WalletDocument};
pub use security::{generate_salt, CbcError, FileKey};
pub use wallet_file::{
    read_wallet_file, release_wallet_reservation, reserve_new_wallet_file, write_new_wallet_file,
    write_wallet_file,
};
