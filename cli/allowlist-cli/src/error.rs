//! Error types for allowlist builds

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building, serializing or checking an allowlist
#[derive(Debug, Error)]
pub enum AllowlistError {
    /// Account is not a well-formed 20-byte address
    #[error("Record {index}: invalid account '{value}': {reason}")]
    InvalidAccount {
        index: usize,
        value: String,
        reason: String,
    },

    /// Entitlement is not a non-negative decimal integer
    #[error("Record {index}: invalid entitlement '{value}': expected a decimal integer")]
    InvalidEntitlement { index: usize, value: String },

    /// Entitlement does not fit in 256 bits
    #[error("Record {index}: entitlement '{value}' exceeds the uint256 range")]
    EncodingOverflow { index: usize, value: String },

    /// Bucketed identifier does not fit in a u64
    #[error("Record {index}: identifier base {base} overflows u64")]
    IdentifierOverflow { index: usize, base: u64 },

    /// No records were supplied
    #[error("Cannot build a Merkle tree from zero records")]
    EmptyTree,

    /// Leaf index outside the tree
    #[error("Leaf index {index} is out of range for tree with {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },

    /// Lookup by value found nothing
    #[error("Leaf not found in tree: {leaf}")]
    LeafNotFound { leaf: String },

    /// Record source could not be parsed
    #[error("{}:{line}: {message}", path.display())]
    InvalidInput {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A hash string is not 32 bytes of hex
    #[error("Invalid hash '{value}': {reason}")]
    InvalidHash { value: String, reason: String },

    /// Artifact could not be encoded, decoded or written
    #[error("Serialization failed: {0}")]
    SerializationFailure(String),
}

/// Result type for allowlist operations
pub type AllowlistResult<T> = Result<T, AllowlistError>;
