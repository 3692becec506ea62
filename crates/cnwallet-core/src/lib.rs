//! CryptoNote wallet core
//!
//! This crate implements wallet identity: spend/view key handling, public
//! address derivation and parsing, the subwallet balance container, and the
//! error taxonomy shared by every wallet crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod identity;
pub mod keys;
pub mod mnemonic;
pub mod subwallets;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use address::{encode_address, parse_address, ParsedAddress};
pub use error::{ErrorCategory, Result, WalletError};
pub use identity::WalletIdentity;
pub use keys::{generate_keys, generate_view_from_spend, PublicKey, SecretKey};
pub use mnemonic::MnemonicDecoder;
pub use subwallets::{SubWallet, SubWallets};
