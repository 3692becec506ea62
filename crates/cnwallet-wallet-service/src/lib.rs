//! Wallet service
//!
//! Lifecycle management for CryptoNote wallets: creating, importing and
//! opening wallet files, the daemon handshake that precedes use, saving, and
//! balance queries.
//!
//! ## Architecture
//!
//! - **Lifecycle**: [`WalletBackend`] and its entry points
//! - **Services**: [`WalletServices`], the runtime and collaborators a wallet
//!   is built with
//! - **Configuration**: [`WalletConfig`], loadable from JSON

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod services;

pub use backend::{WalletBackend, WalletState};
pub use cnwallet_core::{Result, WalletError};
pub use config::WalletConfig;
pub use services::WalletServices;
