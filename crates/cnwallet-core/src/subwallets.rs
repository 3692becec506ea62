//! Subwallet container: per-address sync start points and balances
//!
//! A wallet starts with one primary subwallet built from its identity. The
//! container is shared between balance queries and the synchronizer, which
//! credits incoming funds as it finds them.

use crate::identity::WalletIdentity;
use crate::keys::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

/// Fresh wallets start scanning a little before the wall clock, since block
/// timestamps may lag behind it.
const CREATION_TIMESTAMP_MARGIN_SECS: u64 = 3_000;

/// One address of the wallet
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubWallet {
    public_spend_key: Option<PublicKey>,
    private_spend_key: SecretKey,
    address: String,
    sync_start_height: u64,
    sync_start_timestamp: u64,
    unlocked_balance: u64,
    is_primary_address: bool,
}

impl SubWallet {
    /// Public spend key, if known
    pub fn public_spend_key(&self) -> Option<&PublicKey> {
        self.public_spend_key.as_ref()
    }

    /// Private spend key (null in view wallets)
    pub fn private_spend_key(&self) -> &SecretKey {
        &self.private_spend_key
    }

    /// Encoded address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Height to start scanning from (0 when the timestamp is used)
    pub fn sync_start_height(&self) -> u64 {
        self.sync_start_height
    }

    /// Timestamp to start scanning from (0 when the height is used)
    pub fn sync_start_timestamp(&self) -> u64 {
        self.sync_start_timestamp
    }

    /// Spendable balance in atomic units
    pub fn unlocked_balance(&self) -> u64 {
        self.unlocked_balance
    }

    /// Whether this is the wallet's primary address
    pub fn is_primary_address(&self) -> bool {
        self.is_primary_address
    }
}

/// All subwallets of one wallet
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubWallets {
    sub_wallets: Vec<SubWallet>,
    is_view_wallet: bool,
}

impl SubWallets {
    /// Build the container with the identity's primary address
    ///
    /// New wallets scan from their creation time, imported wallets from
    /// `scan_height`.
    pub fn new(identity: &WalletIdentity, scan_height: u64, new_wallet: bool) -> Self {
        let (sync_start_height, sync_start_timestamp) = if new_wallet {
            let now = chrono::Utc::now().timestamp().max(0) as u64;
            (0, now.saturating_sub(CREATION_TIMESTAMP_MARGIN_SECS))
        } else {
            (scan_height, 0)
        };

        let primary = SubWallet {
            public_spend_key: identity.public_spend_key().copied(),
            private_spend_key: identity.private_spend_key().clone(),
            address: identity.address().to_string(),
            sync_start_height,
            sync_start_timestamp,
            unlocked_balance: 0,
            is_primary_address: true,
        };

        Self {
            sub_wallets: vec![primary],
            is_view_wallet: identity.is_view_wallet(),
        }
    }

    /// The primary subwallet; `None` only for a malformed container
    pub fn primary(&self) -> Option<&SubWallet> {
        self.sub_wallets.iter().find(|w| w.is_primary_address)
    }

    /// All subwallets
    pub fn sub_wallets(&self) -> &[SubWallet] {
        &self.sub_wallets
    }

    /// Whether the container belongs to a view wallet
    pub fn is_view_wallet(&self) -> bool {
        self.is_view_wallet
    }

    /// Earliest point the synchronizer must scan from, as `(height, timestamp)`
    ///
    /// A non-zero minimum height wins; otherwise the minimum timestamp is used.
    pub fn min_initial_sync_start(&self) -> (u64, u64) {
        let min_height = self
            .sub_wallets
            .iter()
            .map(|w| w.sync_start_height)
            .min()
            .unwrap_or(0);

        if min_height != 0 {
            return (min_height, 0);
        }

        let min_timestamp = self
            .sub_wallets
            .iter()
            .map(|w| w.sync_start_timestamp)
            .min()
            .unwrap_or(0);

        (0, min_timestamp)
    }

    /// Sum the balance of the subwallets owning `spend_keys`, or of every
    /// subwallet when `take_from_all` is set
    pub fn get_balance(&self, spend_keys: &[PublicKey], take_from_all: bool) -> u64 {
        self.sub_wallets
            .iter()
            .filter(|w| {
                take_from_all
                    || w.public_spend_key
                        .as_ref()
                        .is_some_and(|key| spend_keys.contains(key))
            })
            .fold(0u64, |total, w| total.saturating_add(w.unlocked_balance))
    }

    /// Whether a subwallet has this public spend key
    pub fn owns_public_spend_key(&self, key: &PublicKey) -> bool {
        self.sub_wallets
            .iter()
            .any(|w| w.public_spend_key.as_ref() == Some(key))
    }

    /// Whether a subwallet has this exact address
    pub fn owns_address(&self, address: &str) -> bool {
        self.sub_wallets.iter().any(|w| w.address == address)
    }

    /// Credit incoming funds to the subwallet owning `key`
    ///
    /// Returns `false` if no subwallet matches.
    pub fn credit(&mut self, key: &PublicKey, amount: u64) -> bool {
        match self
            .sub_wallets
            .iter_mut()
            .find(|w| w.public_spend_key.as_ref() == Some(key))
        {
            Some(wallet) => {
                wallet.unlocked_balance = wallet.unlocked_balance.saturating_add(amount);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_keys;
    use cnwallet_params::Network;

    #[test]
    fn test_new_wallet_syncs_from_timestamp() {
        let identity = WalletIdentity::create(&Network::mainnet());
        let wallets = SubWallets::new(&identity, 0, true);
        let (height, timestamp) = wallets.min_initial_sync_start();

        let now = chrono::Utc::now().timestamp() as u64;
        assert_eq!(height, 0);
        assert!(timestamp <= now);
        assert!(timestamp >= now - CREATION_TIMESTAMP_MARGIN_SECS - 60);
    }

    #[test]
    fn test_imported_wallet_syncs_from_height() {
        let identity = WalletIdentity::create(&Network::mainnet());
        let wallets = SubWallets::new(&identity, 1_250_000, false);
        assert_eq!(wallets.min_initial_sync_start(), (1_250_000, 0));
    }

    #[test]
    fn test_imported_at_zero_scans_everything() {
        let identity = WalletIdentity::create(&Network::mainnet());
        let wallets = SubWallets::new(&identity, 0, false);
        assert_eq!(wallets.min_initial_sync_start(), (0, 0));
    }

    #[test]
    fn test_balance_starts_at_zero() {
        let identity = WalletIdentity::create(&Network::mainnet());
        let wallets = SubWallets::new(&identity, 0, true);
        assert_eq!(wallets.get_balance(&[], true), 0);
        assert_eq!(wallets.primary().unwrap().address(), identity.address());
    }

    #[test]
    fn test_credit_and_filtered_balance() {
        let identity = WalletIdentity::create(&Network::mainnet());
        let mut wallets = SubWallets::new(&identity, 0, true);
        let key = *identity.public_spend_key().unwrap();

        assert!(wallets.credit(&key, 500));
        assert!(wallets.credit(&key, 250));
        assert_eq!(wallets.get_balance(&[key], false), 750);
        assert_eq!(wallets.get_balance(&[], false), 0);
        assert_eq!(wallets.get_balance(&[], true), 750);

        let (other, _) = generate_keys();
        assert!(!wallets.credit(&other, 1));
        assert!(!wallets.owns_public_spend_key(&other));
        assert!(wallets.owns_public_spend_key(&key));
    }

    #[test]
    fn test_view_wallet_container() {
        let network = Network::mainnet();
        let full = WalletIdentity::create(&network);
        let view = WalletIdentity::from_view_key(full.private_view_key().clone(), full.address(), &network);
        let wallets = SubWallets::new(&view, 10, false);

        assert!(wallets.is_view_wallet());
        assert!(wallets.primary().unwrap().private_spend_key().is_null());
        assert!(wallets.owns_address(full.address()));
    }
}
