//! Property-based tests for cnwallet-core
//!
//! Uses proptest to verify identity and address invariants across randomized keys

use cnwallet_core::{
    generate_view_from_spend, parse_address, MnemonicDecoder, SecretKey, WalletError,
    WalletIdentity,
};
use cnwallet_params::Network;
use proptest::prelude::*;

/// Treats the phrase as the hex spend key
struct HexSeedDecoder;

impl MnemonicDecoder for HexSeedDecoder {
    fn seed_to_private_key(&self, seed: &str) -> std::result::Result<SecretKey, String> {
        SecretKey::from_hex(seed).ok_or_else(|| "unknown word".to_string())
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate arbitrary 32-byte secret keys
fn secret_key_strategy() -> impl Strategy<Value = SecretKey> {
    any::<[u8; 32]>().prop_map(SecretKey::from_bytes)
}

// ============================================================================
// Identity Properties
// ============================================================================

proptest! {
    /// Property: importing keys and importing the seed of the same spend key
    /// yield the same address
    #[test]
    fn prop_seed_and_keys_agree(spend in secret_key_strategy()) {
        let network = Network::mainnet();
        let view = generate_view_from_spend(&spend);

        let from_keys = WalletIdentity::from_keys(spend.clone(), view, &network);
        let phrase = spend.to_hex();
        let from_seed = WalletIdentity::from_seed(&phrase, &HexSeedDecoder, &network)
            .expect("phrase decodes");

        prop_assert_eq!(from_keys.address(), from_seed.address());
        prop_assert_eq!(from_keys.private_view_key(), from_seed.private_view_key());
    }

    /// Property: the address always parses back to the identity's public keys
    #[test]
    fn prop_address_round_trip(spend in secret_key_strategy(), view in secret_key_strategy()) {
        let network = Network::mainnet();
        let identity = WalletIdentity::from_keys(spend, view, &network);
        let parsed = parse_address(&network, identity.address()).expect("valid address");

        prop_assert_eq!(Some(&parsed.public_spend_key), identity.public_spend_key());
        prop_assert_eq!(&parsed.public_view_key, identity.public_view_key());
    }

    /// Property: a view wallet never carries a real spend key
    #[test]
    fn prop_view_wallet_spend_key_is_null(view in secret_key_strategy(), address in "[1-9A-Za-z]{0,120}") {
        let identity = WalletIdentity::from_view_key(view, &address, &Network::mainnet());
        prop_assert!(identity.is_view_wallet());
        prop_assert!(identity.private_spend_key().is_null());
        prop_assert_eq!(identity.address(), address.as_str());
    }

    /// Property: addresses for one network never validate on the other
    #[test]
    fn prop_network_prefixes_do_not_collide(spend in secret_key_strategy(), view in secret_key_strategy()) {
        let identity = WalletIdentity::from_keys(spend, view, &Network::testnet());
        prop_assert_eq!(
            parse_address(&Network::mainnet(), identity.address()),
            Err(WalletError::AddressWrongPrefix)
        );
    }
}

#[test]
fn test_unknown_words_are_invalid_mnemonic() {
    let result = WalletIdentity::from_seed(
        "abbey abducts ability able",
        &HexSeedDecoder,
        &Network::mainnet(),
    );
    assert_eq!(result.unwrap_err(), WalletError::InvalidMnemonic);
}
