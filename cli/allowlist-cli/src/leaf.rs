//! Allowlist records and their canonical leaf encoding
//!
//! A record is encoded as the Solidity ABI encoding of `(address, uint256)`
//! and hashed twice with Keccak256, matching the leaf format expected by
//! `MerkleProof.verify` style on-chain verifiers.

use alloy_primitives::U256;

use crate::common::{keccak256, parse_address, to_checksum_address};
use crate::error::{AllowlistError, AllowlistResult};

/// Length of the ABI-encoded `(address, uint256)` tuple.
pub const ENCODED_LEN: usize = 64;

/// One allowlist entry: an account and the amount it may claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    pub account: [u8; 20],
    pub entitlement: U256,
}

impl Record {
    pub fn new(account: [u8; 20], entitlement: U256) -> Self {
        Self {
            account,
            entitlement,
        }
    }

    /// Parses a record from its textual fields.
    ///
    /// `index` is the record's position in the input and is carried into any
    /// error. `decimals` scales the amount by `10^decimals`.
    pub fn parse(index: usize, address: &str, amount: &str, decimals: u8) -> AllowlistResult<Self> {
        let account = parse_address(address).map_err(|e| AllowlistError::InvalidAccount {
            index,
            value: address.to_string(),
            reason: e.to_string(),
        })?;
        let entitlement = parse_entitlement(index, amount, decimals)?;
        Ok(Self::new(account, entitlement))
    }

    /// ABI encoding of the record: 12 zero bytes, the address, then the
    /// entitlement as a 32-byte big-endian word.
    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut encoded = [0u8; ENCODED_LEN];
        encoded[12..32].copy_from_slice(&self.account);
        encoded[32..64].copy_from_slice(&self.entitlement.to_be_bytes::<32>());
        encoded
    }

    /// Leaf hash: `keccak256(keccak256(encode(record)))`.
    pub fn leaf_hash(&self) -> [u8; 32] {
        keccak256(&keccak256(&self.encode()))
    }

    pub fn checksum_address(&self) -> String {
        to_checksum_address(&self.account)
    }
}

/// Parses a non-negative decimal amount into a `U256`, scaled by
/// `10^decimals`.
pub fn parse_entitlement(index: usize, amount: &str, decimals: u8) -> AllowlistResult<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AllowlistError::InvalidEntitlement {
            index,
            value: amount.to_string(),
        });
    }

    let overflow = || AllowlistError::EncodingOverflow {
        index,
        value: amount.to_string(),
    };

    let value: U256 = trimmed.parse().map_err(|_| overflow())?;
    if decimals == 0 {
        return Ok(value);
    }
    let scale = U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or_else(overflow)?;
    value.checked_mul(scale).ok_or_else(overflow)
}
