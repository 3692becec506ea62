//! Key generation and management
//!
//! CryptoNote keys are ed25519 scalars. The private view key of a standard
//! wallet is derived from the private spend key, so a spend key alone is
//! enough to restore a wallet.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Key length in bytes
pub const KEY_LENGTH: usize = 32;

/// Private key (spend or view). Zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LENGTH]);

impl SecretKey {
    /// The null key used in place of the spend key of view wallets
    pub const fn null() -> Self {
        Self([0u8; KEY_LENGTH])
    }

    /// Create from raw key bytes
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(value: &str) -> Option<Self> {
        let bytes = Zeroizing::new(hex::decode(value).ok()?);
        let array: [u8; KEY_LENGTH] = bytes.as_slice().try_into().ok()?;
        Some(Self(array))
    }

    /// Hex encoding of the key
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    /// Get key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Whether this is the null key
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    fn scalar(&self) -> Scalar {
        Scalar::from_bytes_mod_order(self.0)
    }

    /// Derive the public key (scalar times the ed25519 basepoint)
    pub fn public_key(&self) -> PublicKey {
        let point = EdwardsPoint::mul_base(&self.scalar());
        PublicKey(point.compress().to_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Zeroizing::new(String::deserialize(deserializer)?);
        SecretKey::from_hex(&value).ok_or_else(|| de::Error::custom("invalid secret key"))
    }
}

/// Public key (compressed ed25519 point)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; KEY_LENGTH]);

impl PublicKey {
    /// Create from compressed point bytes
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(value: &str) -> Option<Self> {
        let bytes = hex::decode(value).ok()?;
        let array: [u8; KEY_LENGTH] = bytes.as_slice().try_into().ok()?;
        Some(Self(array))
    }

    /// Get key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Whether the bytes decode to a curve point
    pub fn is_valid_point(&self) -> bool {
        CompressedEdwardsY(self.0).decompress().is_some()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        PublicKey::from_hex(&value).ok_or_else(|| de::Error::custom("invalid public key"))
    }
}

/// Generate a fresh random key pair
pub fn generate_keys() -> (PublicKey, SecretKey) {
    let mut wide = Zeroizing::new([0u8; 64]);
    OsRng.fill_bytes(&mut wide[..]);
    let mut scalar = Scalar::from_bytes_mod_order_wide(&wide);
    let secret = SecretKey(scalar.to_bytes());
    scalar.zeroize();
    (secret.public_key(), secret)
}

/// Derive the private view key deterministically from the private spend key
///
/// `view = keccak256(spend) mod l`
pub fn generate_view_from_spend(spend_key: &SecretKey) -> SecretKey {
    let hash = Keccak256::digest(spend_key.as_bytes());
    let mut digest = Zeroizing::new([0u8; KEY_LENGTH]);
    digest.copy_from_slice(&hash);
    let mut scalar = Scalar::from_bytes_mod_order(*digest);
    let view = SecretKey(scalar.to_bytes());
    scalar.zeroize();
    view
}
