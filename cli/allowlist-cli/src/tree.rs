//! Sorted-pair Keccak Merkle tree over allowlist records
//!
//! Layer 0 holds the leaf hashes sorted ascending by byte value, so the root
//! does not depend on input order. Each parent is `hash_pair` of two adjacent
//! nodes. When a layer has an odd number of nodes the last one is promoted to
//! the next layer unchanged; it is never duplicated or padded.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::common::{hash_pair, hex_encode};
use crate::error::{AllowlistError, AllowlistResult};
use crate::leaf::Record;

/// An immutable Merkle tree with the mapping from input index to leaf position
#[derive(Debug, Clone)]
pub struct AllowlistTree {
    /// Levels of the tree; `layers[0]` are the sorted leaves, the last level
    /// holds only the root
    layers: Vec<Vec<[u8; 32]>>,

    /// `positions[i]` is the sorted leaf position of input record `i`
    positions: Vec<usize>,
}

impl AllowlistTree {
    /// Build a tree from records in input order
    pub fn build(records: &[Record]) -> AllowlistResult<Self> {
        if records.is_empty() {
            return Err(AllowlistError::EmptyTree);
        }

        let leaves: Vec<[u8; 32]> = records.par_iter().map(Record::leaf_hash).collect();
        let tree = Self::from_leaf_hashes(leaves)?;

        info!(
            leaves = tree.len(),
            depth = tree.depth(),
            root = %hex_encode(tree.root()),
            "built merkle tree"
        );
        Ok(tree)
    }

    /// Build a tree from leaf hashes in input order
    pub fn from_leaf_hashes(leaves: Vec<[u8; 32]>) -> AllowlistResult<Self> {
        if leaves.is_empty() {
            return Err(AllowlistError::EmptyTree);
        }

        // Ties between identical leaves keep input order.
        let mut sorted: Vec<([u8; 32], usize)> = leaves
            .into_iter()
            .enumerate()
            .map(|(index, leaf)| (leaf, index))
            .collect();
        sorted.par_sort_unstable();

        let mut positions = vec![0usize; sorted.len()];
        for (position, &(_, index)) in sorted.iter().enumerate() {
            positions[index] = position;
        }

        let mut layers = vec![sorted.into_iter().map(|(leaf, _)| leaf).collect::<Vec<_>>()];
        loop {
            let current = &layers[layers.len() - 1];
            if current.len() == 1 {
                break;
            }
            let next: Vec<[u8; 32]> = current
                .par_chunks(2)
                .map(|pair| match *pair {
                    [left, right] => hash_pair(left, right),
                    [promoted] => promoted,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            debug!(level = layers.len(), nodes = next.len(), "built layer");
            layers.push(next);
        }

        Ok(Self { layers, positions })
    }

    pub fn root(&self) -> [u8; 32] {
        // Construction guarantees a final single-node layer.
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of levels above the leaves
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// All levels, leaves first
    pub fn layers(&self) -> &[Vec<[u8; 32]>] {
        &self.layers
    }

    /// Leaf hash of the record at input index `index`
    pub fn leaf(&self, index: usize) -> AllowlistResult<[u8; 32]> {
        let position = self.position(index)?;
        Ok(self.layers[0][position])
    }

    /// Inclusion proof for the record at input index `index`.
    ///
    /// Siblings are ordered leaf-adjacent first. Levels where the node was the
    /// promoted odd element contribute no sibling.
    pub fn proof(&self, index: usize) -> AllowlistResult<Vec<[u8; 32]>> {
        let position = self.position(index)?;
        Ok(self.proof_at(position))
    }

    /// Inclusion proof looked up by leaf hash
    pub fn proof_for_leaf(&self, leaf: &[u8; 32]) -> AllowlistResult<Vec<[u8; 32]>> {
        let position = self.layers[0]
            .binary_search(leaf)
            .map_err(|_| AllowlistError::LeafNotFound {
                leaf: hex_encode(leaf),
            })?;
        Ok(self.proof_at(position))
    }

    /// Inclusion proof looked up by record value
    pub fn proof_for_record(&self, record: &Record) -> AllowlistResult<Vec<[u8; 32]>> {
        self.proof_for_leaf(&record.leaf_hash())
            .map_err(|_| AllowlistError::LeafNotFound {
                leaf: format!("{} => {}", record.checksum_address(), record.entitlement),
            })
    }

    /// Renders every node as `level:index:0xhash`, one per line.
    pub fn dump_layers(&self) -> String {
        let mut out = String::new();
        for (level_num, level) in self.layers.iter().enumerate() {
            for (i, hash) in level.iter().enumerate() {
                out.push_str(&format!("{}:{}:{}\n", level_num, i, hex_encode(hash)));
            }
        }
        out
    }

    fn position(&self, index: usize) -> AllowlistResult<usize> {
        self.positions
            .get(index)
            .copied()
            .ok_or(AllowlistError::IndexOutOfRange {
                index,
                len: self.positions.len(),
            })
    }

    fn proof_at(&self, position: usize) -> Vec<[u8; 32]> {
        let mut proof = Vec::with_capacity(self.depth());
        let mut current = position;

        for level in &self.layers[..self.layers.len() - 1] {
            let sibling = current ^ 1;
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            current /= 2;
        }

        proof
    }
}

/// Replays a proof: folds `leaf` with each sibling using sorted-pair hashing
/// and compares the result to `root`.
pub fn verify_proof(root: &[u8; 32], leaf: &[u8; 32], proof: &[[u8; 32]]) -> bool {
    compute_root(leaf, proof) == *root
}

/// Root implied by a leaf and its proof
pub fn compute_root(leaf: &[u8; 32], proof: &[[u8; 32]]) -> [u8; 32] {
    proof
        .iter()
        .fold(*leaf, |current, sibling| hash_pair(current, *sibling))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn create_test_record(index: u8) -> Record {
        let mut account = [0x11u8; 20];
        account[19] = index.wrapping_add(1);
        Record::new(account, U256::from(1_000u64 + index as u64))
    }

    fn sorted_leaves(records: &[Record]) -> Vec<[u8; 32]> {
        let mut leaves: Vec<[u8; 32]> = records.iter().map(Record::leaf_hash).collect();
        leaves.sort();
        leaves
    }

    #[test]
    fn test_empty_tree() {
        let err = AllowlistTree::build(&[]).unwrap_err();
        assert!(matches!(err, AllowlistError::EmptyTree));
    }

    #[test]
    fn test_single_leaf() {
        let record = create_test_record(0);
        let tree = AllowlistTree::build(&[record]).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root(), record.leaf_hash());
        assert!(tree.proof(0).unwrap().is_empty());
        assert!(verify_proof(&tree.root(), &record.leaf_hash(), &[]));
    }

    #[test]
    fn test_two_leaves() {
        let records: Vec<Record> = (0..2).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();

        let expected = hash_pair(records[0].leaf_hash(), records[1].leaf_hash());
        assert_eq!(tree.root(), expected);
        assert_eq!(tree.proof(0).unwrap(), vec![records[1].leaf_hash()]);
        assert_eq!(tree.proof(1).unwrap(), vec![records[0].leaf_hash()]);
    }

    #[test]
    fn test_three_leaves_promotes_odd_node() {
        let records: Vec<Record> = (0..3).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();
        let [a, b, c]: [[u8; 32]; 3] = sorted_leaves(&records).try_into().unwrap();

        let ab = hash_pair(a, b);
        assert_eq!(tree.layers()[1], vec![ab, c]);
        assert_eq!(tree.root(), hash_pair(ab, c));

        // The promoted leaf has no sibling at level 0.
        assert_eq!(tree.proof_for_leaf(&c).unwrap(), vec![ab]);
        assert_eq!(tree.proof_for_leaf(&a).unwrap(), vec![b, c]);
    }

    #[test]
    fn test_five_leaves_promotes_odd_node_twice() {
        let records: Vec<Record> = (0..5).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();
        let [a, b, c, d, e]: [[u8; 32]; 5] = sorted_leaves(&records).try_into().unwrap();

        let ab = hash_pair(a, b);
        let cd = hash_pair(c, d);
        let abcd = hash_pair(ab, cd);
        assert_eq!(tree.layers()[1], vec![ab, cd, e]);
        assert_eq!(tree.layers()[2], vec![abcd, e]);
        assert_eq!(tree.root(), hash_pair(abcd, e));
        assert_eq!(tree.depth(), 3);

        assert_eq!(tree.proof_for_leaf(&e).unwrap(), vec![abcd]);
        assert_eq!(tree.proof_for_leaf(&c).unwrap(), vec![d, ab, e]);
    }

    fn repeated_byte_records(count: u8) -> Vec<Record> {
        (1..=count)
            .map(|i| Record::new([i; 20], U256::from(i)))
            .collect()
    }

    #[test]
    fn test_three_and_five_leaf_roots_known_vectors() {
        let tree = AllowlistTree::build(&repeated_byte_records(3)).unwrap();
        assert_eq!(
            hex_encode(tree.root()),
            "0xad93045f13119de2ba1fee7215de97bf0b046185f0e0e15394063c5f469f88d4"
        );

        let tree = AllowlistTree::build(&repeated_byte_records(5)).unwrap();
        assert_eq!(
            hex_encode(tree.root()),
            "0xd3dd8922c2700048ed4d2f3602d16d3db63083cb48bfddc0683bd1595dd2de6b"
        );
    }

    #[test]
    fn test_all_proofs_verify() {
        for count in 1..=33u8 {
            let records: Vec<Record> = (0..count).map(create_test_record).collect();
            let tree = AllowlistTree::build(&records).unwrap();

            for (i, record) in records.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert!(proof.len() <= tree.depth());
                assert!(
                    verify_proof(&tree.root(), &record.leaf_hash(), &proof),
                    "proof for leaf {} of {} failed",
                    i,
                    count
                );
            }
        }
    }

    #[test]
    fn test_proof_is_repeatable() {
        let records: Vec<Record> = (0..7).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();
        assert_eq!(tree.proof(4).unwrap(), tree.proof(4).unwrap());
    }

    #[test]
    fn test_root_independent_of_input_order() {
        let records: Vec<Record> = (0..9).map(create_test_record).collect();
        let mut reversed = records.clone();
        reversed.reverse();

        let tree = AllowlistTree::build(&records).unwrap();
        let tree_rev = AllowlistTree::build(&reversed).unwrap();
        assert_eq!(tree.root(), tree_rev.root());
        assert_eq!(tree.proof(0).unwrap(), tree_rev.proof(8).unwrap());
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let record = create_test_record(3);
        let records = vec![record, create_test_record(4), record];
        let tree = AllowlistTree::build(&records).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.leaf(0).unwrap(), tree.leaf(2).unwrap());
        for i in 0..3 {
            assert!(verify_proof(
                &tree.root(),
                &records[i].leaf_hash(),
                &tree.proof(i).unwrap()
            ));
        }
    }

    #[test]
    fn test_proof_out_of_range() {
        let records: Vec<Record> = (0..4).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();
        let err = tree.proof(4).unwrap_err();
        assert!(matches!(
            err,
            AllowlistError::IndexOutOfRange { index: 4, len: 4 }
        ));
    }

    #[test]
    fn test_proof_for_unknown_record() {
        let records: Vec<Record> = (0..4).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();

        assert_eq!(
            tree.proof_for_record(&records[2]).unwrap(),
            tree.proof(2).unwrap()
        );
        let err = tree.proof_for_record(&create_test_record(9)).unwrap_err();
        assert!(matches!(err, AllowlistError::LeafNotFound { .. }));
    }

    #[test]
    fn test_wrong_leaf_fails_verification() {
        let records: Vec<Record> = (0..8).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();
        let proof = tree.proof(0).unwrap();

        assert!(!verify_proof(
            &tree.root(),
            &create_test_record(100).leaf_hash(),
            &proof
        ));
    }

    #[test]
    fn test_dump_layers() {
        let records: Vec<Record> = (0..3).map(create_test_record).collect();
        let tree = AllowlistTree::build(&records).unwrap();
        let dump = tree.dump_layers();

        assert_eq!(dump.lines().count(), 3 + 2 + 1);
        assert!(dump.ends_with(&format!("2:0:{}\n", hex_encode(tree.root()))));
    }
}
