//! Public address encoding and parsing
//!
//! Address bytes are `varint(prefix) || public_spend || public_view || checksum`,
//! where the checksum is the first four bytes of keccak256 over everything
//! before it. The bytes are rendered with CryptoNote's block base58: 8-byte
//! blocks map to 11 characters, the trailing partial block to a shorter run.

use crate::keys::{PublicKey, KEY_LENGTH};
use crate::{Result, WalletError};
use cnwallet_params::Network;
use sha3::{Digest, Keccak256};

const FULL_BLOCK_SIZE: usize = 8;
const FULL_ENCODED_BLOCK_SIZE: usize = 11;
/// Encoded length indexed by raw block length.
const ENCODED_BLOCK_SIZES: [usize; FULL_BLOCK_SIZE + 1] = [0, 2, 3, 5, 6, 7, 9, 10, 11];
const CHECKSUM_SIZE: usize = 4;
const BASE58_ZERO: char = '1';

/// Public keys recovered from an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAddress {
    /// Public spend key
    pub public_spend_key: PublicKey,
    /// Public view key
    pub public_view_key: PublicKey,
}

/// Encode the two public keys as an address for `network`
pub fn encode_address(
    network: &Network,
    public_spend_key: &PublicKey,
    public_view_key: &PublicKey,
) -> String {
    let mut data = Vec::with_capacity(10 + 2 * KEY_LENGTH + CHECKSUM_SIZE);
    write_varint(network.address_prefix, &mut data);
    data.extend_from_slice(public_spend_key.as_bytes());
    data.extend_from_slice(public_view_key.as_bytes());
    let checksum = Keccak256::digest(&data);
    data.extend_from_slice(&checksum[..CHECKSUM_SIZE]);
    encode_base58(&data)
}

/// Parse and validate an address for `network`
pub fn parse_address(network: &Network, address: &str) -> Result<ParsedAddress> {
    if address.len() != network.address_length {
        return Err(WalletError::AddressWrongLength);
    }

    let data = decode_base58(address).ok_or(WalletError::AddressNotValid)?;

    let (prefix, prefix_len) = read_varint(&data).ok_or(WalletError::AddressNotValid)?;
    if prefix != network.address_prefix {
        return Err(WalletError::AddressWrongPrefix);
    }

    let body = &data[prefix_len..];
    if body.len() != 2 * KEY_LENGTH + CHECKSUM_SIZE {
        return Err(WalletError::AddressWrongLength);
    }

    let (signed, checksum) = data.split_at(data.len() - CHECKSUM_SIZE);
    if Keccak256::digest(signed)[..CHECKSUM_SIZE] != *checksum {
        return Err(WalletError::AddressNotValid);
    }

    let mut spend = [0u8; KEY_LENGTH];
    let mut view = [0u8; KEY_LENGTH];
    spend.copy_from_slice(&body[..KEY_LENGTH]);
    view.copy_from_slice(&body[KEY_LENGTH..2 * KEY_LENGTH]);

    let parsed = ParsedAddress {
        public_spend_key: PublicKey::from_bytes(spend),
        public_view_key: PublicKey::from_bytes(view),
    };

    if !parsed.public_spend_key.is_valid_point() || !parsed.public_view_key.is_valid_point() {
        return Err(WalletError::AddressNotValid);
    }

    Ok(parsed)
}

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn read_varint(data: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in data.iter().enumerate().take(10) {
        let shift = 7 * i as u32;
        value |= u64::from(byte & 0x7f).checked_shl(shift)?;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

fn encode_base58(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() / FULL_BLOCK_SIZE * FULL_ENCODED_BLOCK_SIZE + 11);
    for block in data.chunks(FULL_BLOCK_SIZE) {
        let encoded_size = ENCODED_BLOCK_SIZES[block.len()];
        let encoded = bs58::encode(block).into_string();
        // bs58 writes leading zero bytes as '1', the same digit used for padding
        let digits = encoded.trim_start_matches(BASE58_ZERO);
        out.extend(std::iter::repeat(BASE58_ZERO).take(encoded_size - digits.len()));
        out.push_str(digits);
    }
    out
}

fn decode_base58(encoded: &str) -> Option<Vec<u8>> {
    if !encoded.is_ascii() {
        return None;
    }

    let mut out = Vec::with_capacity(encoded.len() / FULL_ENCODED_BLOCK_SIZE * FULL_BLOCK_SIZE + 8);
    for chunk in encoded.as_bytes().chunks(FULL_ENCODED_BLOCK_SIZE) {
        let block_size = ENCODED_BLOCK_SIZES.iter().position(|&s| s == chunk.len())?;
        let chunk = std::str::from_utf8(chunk).ok()?;
        let decoded = bs58::decode(chunk).into_vec().ok()?;

        let first_significant = decoded.iter().position(|&b| b != 0).unwrap_or(decoded.len());
        let significant = &decoded[first_significant..];
        if significant.len() > block_size {
            return None;
        }

        out.extend(std::iter::repeat(0u8).take(block_size - significant.len()));
        out.extend_from_slice(significant);
    }
    Some(out)
}
