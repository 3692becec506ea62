//! CryptoNote wallet network parameters and constants
//!
//! This crate provides network-specific constants (address prefixes, daemon
//! ports) and the fixed constants of the encrypted wallet file format.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod network;
pub mod wallet_file;

pub use network::{Network, NetworkType};
pub use wallet_file::{
    IS_A_WALLET_IDENTIFIER, IS_CORRECT_PASSWORD_IDENTIFIER, KEY_SIZE, PBKDF2_ITERATIONS,
    SALT_SIZE, WALLET_FILE_FORMAT_VERSION,
};

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid network specified
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
