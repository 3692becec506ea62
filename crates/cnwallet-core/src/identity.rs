//! Wallet identity: the key material and primary address of a wallet

use crate::address::{encode_address, parse_address};
use crate::keys::{generate_keys, generate_view_from_spend, PublicKey, SecretKey};
use crate::mnemonic::MnemonicDecoder;
use crate::{Result, WalletError};
use cnwallet_params::Network;
use tracing::{debug, warn};

/// Keys and address of one wallet
///
/// The address is computed once, when the identity is built. Secret keys are
/// zeroed when the identity is dropped.
#[derive(Debug)]
pub struct WalletIdentity {
    private_spend_key: SecretKey,
    private_view_key: SecretKey,
    public_spend_key: Option<PublicKey>,
    public_view_key: PublicKey,
    is_view_wallet: bool,
    address: String,
}

impl WalletIdentity {
    /// Generate a new wallet: random spend key, view key derived from it
    pub fn create(network: &Network) -> Self {
        let (_, spend_key) = generate_keys();
        let view_key = generate_view_from_spend(&spend_key);
        Self::from_keys(spend_key, view_key, network)
    }

    /// Restore a wallet from its mnemonic seed
    pub fn from_seed(
        mnemonic: &str,
        decoder: &dyn MnemonicDecoder,
        network: &Network,
    ) -> Result<Self> {
        let spend_key = decoder.seed_to_private_key(mnemonic).map_err(|reason| {
            debug!("Mnemonic rejected: {}", reason);
            WalletError::InvalidMnemonic
        })?;
        let view_key = generate_view_from_spend(&spend_key);
        Ok(Self::from_keys(spend_key, view_key, network))
    }

    /// Restore a wallet from an explicit spend and view key
    pub fn from_keys(spend_key: SecretKey, view_key: SecretKey, network: &Network) -> Self {
        let public_spend_key = spend_key.public_key();
        let public_view_key = view_key.public_key();
        let address = encode_address(network, &public_spend_key, &public_view_key);

        Self {
            private_spend_key: spend_key,
            private_view_key: view_key,
            public_spend_key: Some(public_spend_key),
            public_view_key,
            is_view_wallet: false,
            address,
        }
    }

    /// Create a view-only wallet from a private view key and its address
    ///
    /// The address is kept as given. When it parses, its public spend key
    /// fills [`public_spend_key`](Self::public_spend_key); otherwise that slot
    /// stays empty.
    pub fn from_view_key(view_key: SecretKey, address: &str, network: &Network) -> Self {
        let public_spend_key = match parse_address(network, address) {
            Ok(parsed) => Some(parsed.public_spend_key),
            Err(e) => {
                warn!("View wallet address did not parse ({}), public spend key unknown", e);
                None
            }
        };

        Self {
            private_spend_key: SecretKey::null(),
            public_view_key: view_key.public_key(),
            private_view_key: view_key,
            public_spend_key,
            is_view_wallet: true,
            address: address.to_string(),
        }
    }

    /// Private spend key (null for view wallets)
    pub fn private_spend_key(&self) -> &SecretKey {
        &self.private_spend_key
    }

    /// Private view key
    pub fn private_view_key(&self) -> &SecretKey {
        &self.private_view_key
    }

    /// Public spend key, if known
    pub fn public_spend_key(&self) -> Option<&PublicKey> {
        self.public_spend_key.as_ref()
    }

    /// Public view key
    pub fn public_view_key(&self) -> &PublicKey {
        &self.public_view_key
    }

    /// Whether this is a view-only wallet
    pub fn is_view_wallet(&self) -> bool {
        self.is_view_wallet
    }

    /// Primary public address
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeMnemonicDecoder;

    #[test]
    fn test_create_derives_view_key() {
        let network = Network::mainnet();
        let identity = WalletIdentity::create(&network);
        assert!(!identity.is_view_wallet());
        assert_eq!(
            identity.private_view_key(),
            &generate_view_from_spend(identity.private_spend_key())
        );
        assert_eq!(identity.address().len(), network.address_length);
    }

    #[test]
    fn test_address_matches_keys() {
        let network = Network::mainnet();
        let identity = WalletIdentity::create(&network);
        let parsed = parse_address(&network, identity.address()).unwrap();
        assert_eq!(Some(&parsed.public_spend_key), identity.public_spend_key());
        assert_eq!(&parsed.public_view_key, identity.public_view_key());
    }

    #[test]
    fn test_seed_rejected() {
        let decoder = FakeMnemonicDecoder::new();
        let err = WalletIdentity::from_seed("not a seed", &decoder, &Network::mainnet()).unwrap_err();
        assert_eq!(err, WalletError::InvalidMnemonic);
    }

    #[test]
    fn test_view_wallet_has_null_spend_key() {
        let network = Network::mainnet();
        let full = WalletIdentity::create(&network);
        let view = WalletIdentity::from_view_key(full.private_view_key().clone(), full.address(), &network);

        assert!(view.is_view_wallet());
        assert!(view.private_spend_key().is_null());
        assert_eq!(view.address(), full.address());
        assert_eq!(view.public_spend_key(), full.public_spend_key());
    }

    #[test]
    fn test_view_wallet_keeps_unparseable_address() {
        let network = Network::mainnet();
        let (_, view_key) = generate_keys();
        let view = WalletIdentity::from_view_key(view_key, "not-an-address", &network);
        assert_eq!(view.address(), "not-an-address");
        assert!(view.public_spend_key().is_none());
    }
}
