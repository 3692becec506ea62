//! Serialized wallet document
//!
//! The JSON payload carried inside the encrypted container. Saving borrows the
//! live wallet state; loading goes through [`PartialWalletDocument`], a plain
//! data snapshot with no daemon or synchronizer task attached yet.

use cnwallet_core::{Result, SecretKey, SubWallets, WalletError, WalletIdentity};
use cnwallet_params::{Network, WALLET_FILE_FORMAT_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Persisted synchronizer progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizerState {
    /// Height scanning started from (0 when the timestamp is used)
    pub start_height: u64,
    /// Timestamp scanning started from (0 when the height is used)
    pub start_timestamp: u64,
    /// Highest block height processed so far
    pub scanned_height: u64,
}

impl SynchronizerState {
    /// Fresh state starting at `(height, timestamp)`
    pub fn starting_at(start_height: u64, start_timestamp: u64) -> Self {
        Self {
            start_height,
            start_timestamp,
            scanned_height: start_height.saturating_sub(1),
        }
    }
}

/// Wallet document as written on save
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDocument<'a> {
    wallet_file_format_version: u32,
    private_view_key: &'a SecretKey,
    is_view_wallet: bool,
    sub_wallets: &'a SubWallets,
    wallet_synchronizer: SynchronizerState,
}

impl<'a> WalletDocument<'a> {
    /// Borrow the parts of a live wallet that get persisted
    pub fn new(
        identity: &'a WalletIdentity,
        sub_wallets: &'a SubWallets,
        wallet_synchronizer: SynchronizerState,
    ) -> Self {
        Self {
            wallet_file_format_version: WALLET_FILE_FORMAT_VERSION,
            private_view_key: identity.private_view_key(),
            is_view_wallet: identity.is_view_wallet(),
            sub_wallets,
            wallet_synchronizer,
        }
    }

    /// Serialize to JSON
    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(self).map(Zeroizing::new).map_err(|e| {
            warn!("Failed to serialize wallet document: {}", e);
            WalletError::WalletFileCorrupted
        })
    }
}

/// Wallet document as read on open, before it is attached to a daemon
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialWalletDocument {
    wallet_file_format_version: u32,
    private_view_key: SecretKey,
    is_view_wallet: bool,
    sub_wallets: SubWallets,
    #[serde(default)]
    wallet_synchronizer: Option<SynchronizerState>,
}

/// Validated pieces of a loaded wallet
#[derive(Debug)]
pub struct RestoredWallet {
    /// Keys and primary address
    pub identity: WalletIdentity,
    /// Subwallets with their balances
    pub sub_wallets: SubWallets,
    /// Saved synchronizer progress, if any
    pub synchronizer: Option<SynchronizerState>,
}

impl PartialWalletDocument {
    /// Parse the decrypted JSON payload
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document: Self = serde_json::from_slice(bytes).map_err(|e| {
            debug!("Wallet document did not parse: {}", e);
            WalletError::WalletFileCorrupted
        })?;

        if document.wallet_file_format_version > WALLET_FILE_FORMAT_VERSION {
            debug!(
                "Wallet document version {} is newer than supported version {}",
                document.wallet_file_format_version, WALLET_FILE_FORMAT_VERSION
            );
            return Err(WalletError::WalletFileCorrupted);
        }

        Ok(document)
    }

    /// Format version the document was written with
    pub fn format_version(&self) -> u32 {
        self.wallet_file_format_version
    }

    /// Rebuild the identity and check it against the stored subwallets
    ///
    /// Spend wallets must reproduce their primary address from the stored
    /// keys. View wallets keep the stored address as is.
    pub fn into_parts(self, network: &Network) -> Result<RestoredWallet> {
        if self.is_view_wallet != self.sub_wallets.is_view_wallet() {
            debug!("Wallet document disagrees with itself about being a view wallet");
            return Err(WalletError::WalletFileCorrupted);
        }

        let primary = self.sub_wallets.primary().ok_or_else(|| {
            debug!("Wallet document has no primary address");
            WalletError::WalletFileCorrupted
        })?;

        let identity = if self.is_view_wallet {
            WalletIdentity::from_view_key(self.private_view_key, primary.address(), network)
        } else {
            let identity = WalletIdentity::from_keys(
                primary.private_spend_key().clone(),
                self.private_view_key,
                network,
            );
            if identity.address() != primary.address() {
                debug!("Stored keys do not reproduce the primary address");
                return Err(WalletError::WalletFileCorrupted);
            }
            identity
        };

        Ok(RestoredWallet {
            identity,
            sub_wallets: self.sub_wallets,
            synchronizer: self.wallet_synchronizer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(identity: &WalletIdentity, sub_wallets: &SubWallets) -> PartialWalletDocument {
        let state = SynchronizerState::starting_at(100, 0);
        let bytes = WalletDocument::new(identity, sub_wallets, state).to_bytes().unwrap();
        PartialWalletDocument::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_document_field_names() {
        let identity = WalletIdentity::create(&Network::mainnet());
        let sub_wallets = SubWallets::new(&identity, 0, true);
        let bytes = WalletDocument::new(&identity, &sub_wallets, SynchronizerState::default())
            .to_bytes()
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["walletFileFormatVersion"], WALLET_FILE_FORMAT_VERSION);
        assert_eq!(json["isViewWallet"], false);
        assert_eq!(json["privateViewKey"], identity.private_view_key().to_hex().as_str());
        assert_eq!(json["subWallets"]["subWallets"][0]["address"], identity.address());
        assert_eq!(json["walletSynchronizer"]["scannedHeight"], 0);
    }

    #[test]
    fn test_spend_wallet_restores() {
        let network = Network::mainnet();
        let identity = WalletIdentity::create(&network);
        let sub_wallets = SubWallets::new(&identity, 100, false);

        let restored = round_trip(&identity, &sub_wallets).into_parts(&network).unwrap();
        assert_eq!(restored.identity.address(), identity.address());
        assert_eq!(restored.identity.private_spend_key(), identity.private_spend_key());
        assert_eq!(restored.synchronizer, Some(SynchronizerState::starting_at(100, 0)));
    }

    #[test]
    fn test_view_wallet_restores() {
        let network = Network::mainnet();
        let full = WalletIdentity::create(&network);
        let identity =
            WalletIdentity::from_view_key(full.private_view_key().clone(), full.address(), &network);
        let sub_wallets = SubWallets::new(&identity, 0, false);

        let restored = round_trip(&identity, &sub_wallets).into_parts(&network).unwrap();
        assert!(restored.identity.is_view_wallet());
        assert!(restored.identity.private_spend_key().is_null());
        assert_eq!(restored.identity.address(), full.address());
    }

    #[test]
    fn test_wrong_network_is_corrupted() {
        let identity = WalletIdentity::create(&Network::testnet());
        let sub_wallets = SubWallets::new(&identity, 0, true);

        let err = round_trip(&identity, &sub_wallets)
            .into_parts(&Network::mainnet())
            .unwrap_err();
        assert_eq!(err, WalletError::WalletFileCorrupted);
    }

    #[test]
    fn test_mismatched_view_key_is_corrupted() {
        let network = Network::mainnet();
        let identity = WalletIdentity::create(&network);
        let other = WalletIdentity::create(&network);
        let sub_wallets = SubWallets::new(&identity, 0, true);

        let bytes = WalletDocument::new(&identity, &sub_wallets, SynchronizerState::default())
            .to_bytes()
            .unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["privateViewKey"] = other.private_view_key().to_hex().as_str().into();

        let document = PartialWalletDocument::from_bytes(json.to_string().as_bytes()).unwrap();
        assert_eq!(document.into_parts(&network).unwrap_err(), WalletError::WalletFileCorrupted);
    }

    #[test]
    fn test_garbage_is_corrupted() {
        assert_eq!(
            PartialWalletDocument::from_bytes(b"not json").unwrap_err(),
            WalletError::WalletFileCorrupted
        );
        assert_eq!(
            PartialWalletDocument::from_bytes(b"{\"walletFileFormatVersion\":0}").unwrap_err(),
            WalletError::WalletFileCorrupted
        );
    }

    #[test]
    fn test_future_version_is_corrupted() {
        let identity = WalletIdentity::create(&Network::mainnet());
        let sub_wallets = SubWallets::new(&identity, 0, true);
        let bytes = WalletDocument::new(&identity, &sub_wallets, SynchronizerState::default())
            .to_bytes()
            .unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["walletFileFormatVersion"] = (WALLET_FILE_FORMAT_VERSION + 1).into();

        assert_eq!(
            PartialWalletDocument::from_bytes(json.to_string().as_bytes()).unwrap_err(),
            WalletError::WalletFileCorrupted
        );
    }

    #[test]
    fn test_missing_synchronizer_is_allowed() {
        let network = Network::mainnet();
        let identity = WalletIdentity::create(&network);
        let sub_wallets = SubWallets::new(&identity, 0, true);
        let bytes = WalletDocument::new(&identity, &sub_wallets, SynchronizerState::default())
            .to_bytes()
            .unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json.as_object_mut().unwrap().remove("walletSynchronizer");

        let document = PartialWalletDocument::from_bytes(json.to_string().as_bytes()).unwrap();
        assert_eq!(document.format_version(), WALLET_FILE_FORMAT_VERSION);
        assert!(document.into_parts(&network).unwrap().synchronizer.is_none());
    }
}
