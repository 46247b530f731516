use alloy_primitives::Address;
use sha3::{Digest, Keccak256};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Reasons an address string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected 40 hex chars, got {0}")]
    Length(usize),
    #[error("invalid hex encoding: {0}")]
    Hex(String),
    #[error("EIP-55 checksum mismatch (expected {0})")]
    Checksum(String),
    #[error("zero address not allowed")]
    Zero,
}

/// Reasons a 32-byte hash string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("expected 64 hex chars, got {0}")]
    Length(usize),
    #[error("invalid hex encoding: {0}")]
    Hex(String),
}

/// Parses an Ethereum address from a hex string.
///
/// Accepts the address with or without a "0x" prefix. All-lowercase and
/// all-uppercase strings are taken as-is; mixed-case strings must carry a
/// valid EIP-55 checksum.
///
/// # Errors
/// Returns an error if the address is not 40 hex characters, contains invalid
/// hex, fails its checksum, or is the zero address
pub fn parse_address(addr_str: &str) -> Result<[u8; 20], AddressError> {
    let trimmed = addr_str.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != 40 {
        return Err(AddressError::Length(cleaned.len()));
    }
    let address = cleaned
        .parse::<Address>()
        .map_err(|e| AddressError::Hex(e.to_string()))?;

    let has_lower = cleaned.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = cleaned.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{cleaned}"), None)
            .map_err(|_| AddressError::Checksum(address.to_checksum(None)))?;
    }

    if address.is_zero() {
        return Err(AddressError::Zero);
    }
    Ok(address.0 .0)
}

/// Renders an address in EIP-55 mixed-case checksum form, "0x"-prefixed.
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    Address::from(*address).to_checksum(None)
}

/// Keccak256 of an arbitrary byte string.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Computes the parent of two nodes with sorted-pair hashing.
///
/// The two 32-byte values are ordered by byte value before concatenation, so
/// `hash_pair(a, b) == hash_pair(b, a)`.
pub fn hash_pair(a: [u8; 32], b: [u8; 32]) -> [u8; 32] {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let hash = Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize();
    hash.into()
}

/// Hex-encodes bytes with a "0x" prefix.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a "0x"-prefixed (or bare) 64-char hex string into a 32-byte hash.
pub fn parse_hash(hash_str: &str) -> Result<[u8; 32], HashError> {
    let trimmed = hash_str.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != 64 {
        return Err(HashError::Length(cleaned.len()));
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash).map_err(|e| HashError::Hex(e.to_string()))?;
    Ok(hash)
}

/// Writes `contents` to `path` via a temporary sibling file and a rename, so
/// readers never observe a half-written file.
pub fn write_file_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        std::fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}
