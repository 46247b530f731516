//! The persisted allowlist artifact: root plus one proof record per input
//!
//! Wire format (pretty-printed JSON):
//!
//! ```json
//! {
//!   "root": "0x…",
//!   "data": [
//!     { "userID": 0, "address": "0x…", "maxTokens": "50000", "proof": ["0x…"] }
//!   ]
//! }
//! ```
//!
//! Entries are kept in input order. `userID` comes from an
//! [`IdentifierPolicy`] and is unrelated to the leaf's position in the tree.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::common::{hex_encode, parse_address, parse_hash, write_file_atomic};
use crate::error::{AllowlistError, AllowlistResult};
use crate::identifier::IdentifierPolicy;
use crate::leaf::{parse_entitlement, Record};
use crate::tree::{verify_proof, AllowlistTree};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub root: String,
    pub data: Vec<ArtifactEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    #[serde(rename = "userID")]
    pub user_id: u64,
    pub address: String,
    #[serde(rename = "maxTokens")]
    pub max_tokens: String,
    pub proof: Vec<String>,
}

impl ArtifactEntry {
    /// Decodes the entry's account and amount. `index` is used for errors.
    pub fn record(&self, index: usize) -> AllowlistResult<Record> {
        Record::parse(index, &self.address, &self.max_tokens, 0)
    }

    pub fn proof_hashes(&self) -> AllowlistResult<Vec<[u8; 32]>> {
        self.proof.iter().map(|p| decode_hash(p)).collect()
    }
}

impl Artifact {
    /// Builds the tree over `records` and packages every proof.
    pub fn build(records: &[Record], identifiers: IdentifierPolicy) -> AllowlistResult<Self> {
        let tree = AllowlistTree::build(records)?;
        Self::from_tree(records, &tree, identifiers)
    }

    /// Packages `tree`, which must have been built from `records`.
    pub fn from_tree(
        records: &[Record],
        tree: &AllowlistTree,
        identifiers: IdentifierPolicy,
    ) -> AllowlistResult<Self> {
        if records.len() != tree.len() {
            return Err(AllowlistError::SerializationFailure(format!(
                "tree has {} leaves but {} records were supplied",
                tree.len(),
                records.len()
            )));
        }

        let data = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let proof = tree.proof(index)?;
                Ok(ArtifactEntry {
                    user_id: identifiers.assign(index)?,
                    address: record.checksum_address(),
                    max_tokens: record.entitlement.to_string(),
                    proof: proof.iter().map(hex_encode).collect(),
                })
            })
            .collect::<AllowlistResult<Vec<_>>>()?;

        Ok(Self {
            root: hex_encode(tree.root()),
            data,
        })
    }

    pub fn root_hash(&self) -> AllowlistResult<[u8; 32]> {
        decode_hash(&self.root)
    }

    pub fn to_json(&self) -> AllowlistResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AllowlistError::SerializationFailure(e.to_string()))
    }

    /// Parses an artifact and checks its root. Entry fields are decoded
    /// lazily so a single malformed entry fails only its own verification.
    pub fn from_json(json: &str) -> AllowlistResult<Self> {
        let artifact: Artifact = serde_json::from_str(json)
            .map_err(|e| AllowlistError::SerializationFailure(e.to_string()))?;
        artifact.root_hash()?;
        Ok(artifact)
    }

    /// Writes the artifact in one atomic step.
    pub fn write(&self, path: &Path) -> AllowlistResult<()> {
        let json = self.to_json()?;
        write_file_atomic(path, &json).map_err(|e| {
            AllowlistError::SerializationFailure(format!("writing {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), entries = self.data.len(), "wrote artifact");
        Ok(())
    }

    pub fn load(path: &Path) -> AllowlistResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AllowlistError::SerializationFailure(format!("reading {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Recomputes the entry's leaf from its fields and replays its proof
    /// against the artifact root.
    pub fn verify_entry(&self, index: usize) -> AllowlistResult<bool> {
        let entry = self.data.get(index).ok_or(AllowlistError::IndexOutOfRange {
            index,
            len: self.data.len(),
        })?;
        let root = self.root_hash()?;
        let record = entry.record(index)?;
        let proof = entry.proof_hashes()?;
        Ok(verify_proof(&root, &record.leaf_hash(), &proof))
    }

    /// Verification outcome per entry, in entry order. Entries whose fields
    /// fail to decode count as failed.
    pub fn verify_all(&self) -> AllowlistResult<Vec<bool>> {
        self.root_hash()?;
        let results = (0..self.data.len())
            .map(|index| match self.verify_entry(index) {
                Ok(valid) => valid,
                Err(e) => {
                    warn!(index, error = %e, "entry could not be decoded");
                    false
                }
            })
            .collect();
        Ok(results)
    }

    /// Indices of the entries whose address is `account`.
    pub fn find_by_account(&self, account: &[u8; 20]) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, entry)| parse_address(&entry.address).ok().as_ref() == Some(account))
            .map(|(index, _)| index)
            .collect()
    }

    /// Total of all entitlements, or `None` if it overflows 256 bits.
    pub fn total_entitlement(&self) -> Option<alloy_primitives::U256> {
        self.data
            .iter()
            .enumerate()
            .try_fold(alloy_primitives::U256::ZERO, |total, (index, entry)| {
                let amount = parse_entitlement(index, &entry.max_tokens, 0).ok()?;
                total.checked_add(amount)
            })
    }
}

fn decode_hash(value: &str) -> AllowlistResult<[u8; 32]> {
    parse_hash(value).map_err(|e| AllowlistError::InvalidHash {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
