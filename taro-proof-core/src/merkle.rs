//! Block Merkle tree construction and inclusion path checks.

use alloc::vec::Vec;

use bitcoin::hashes::{sha256d::Hash as Sha256dHash, Hash};
use bitcoin::{TxMerkleNode, Txid};
use taro_proof_types::proof::MerkleInclusionPath;
use thiserror::Error;

/// Errors returned by the Merkle tree builder.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A tree needs at least one transaction.
    #[error("cannot build a merkle tree without transactions")]
    EmptyTree,
    /// The requested leaf does not exist.
    #[error("leaf index {index} out of range for {leaf_count} leaves")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },
}

/// Trait for hashing Merkle node pairs.
pub trait MerkleHasher {
    /// Hashes a left/right node pair into its parent.
    fn hash_nodes(&self, left: [u8; 32], right: [u8; 32]) -> [u8; 32];
}

/// Bitcoin merkle hasher using double-SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcoinMerkleHasher;

impl MerkleHasher for BitcoinMerkleHasher {
    /// Hashes a node pair with double-SHA-256.
    fn hash_nodes(&self, left: [u8; 32], right: [u8; 32]) -> [u8; 32] {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&left);
        buf[32..].copy_from_slice(&right);
        Sha256dHash::hash(&buf).to_byte_array()
    }
}

/// A fully materialised block Merkle tree.
///
/// `levels[0]` holds the txids in block order and the last level holds the
/// root alone. A level with an odd number of nodes pairs its last node with
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Builds the tree over `txids` with the base chain's hasher.
    pub fn build(txids: &[Txid]) -> Result<Self, Error> {
        Self::build_with_hasher(txids, &BitcoinMerkleHasher)
    }

    /// Builds the tree over `txids` with a caller-provided node hasher.
    pub fn build_with_hasher<H: MerkleHasher>(txids: &[Txid], hasher: &H) -> Result<Self, Error> {
        if txids.is_empty() {
            return Err(Error::EmptyTree);
        }

        let mut levels = Vec::new();
        let mut level: Vec<[u8; 32]> = txids.iter().map(|txid| txid.to_byte_array()).collect();
        while level.len() > 1 {
            let next = level
                .chunks(2)
                .map(|pair| {
                    let left = pair[0];
                    let right = pair.get(1).copied().unwrap_or(left);
                    hasher.hash_nodes(left, right)
                })
                .collect();
            levels.push(level);
            level = next;
        }
        levels.push(level);

        Ok(MerkleTree { levels })
    }

    /// Returns the Merkle root.
    pub fn root(&self) -> TxMerkleNode {
        // `build` never produces an empty top level.
        let top = self.levels.last().and_then(|level| level.first());
        TxMerkleNode::from_byte_array(top.copied().unwrap_or([0u8; 32]))
    }

    /// Returns every level, leaves first.
    pub fn levels(&self) -> &[Vec<[u8; 32]>] {
        &self.levels
    }

    /// Returns the number of transactions the tree was built over.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Returns the block position of `txid`, if present.
    pub fn position(&self, txid: &Txid) -> Option<usize> {
        let needle = txid.to_byte_array();
        self.levels
            .first()
            .and_then(|leaves| leaves.iter().position(|leaf| *leaf == needle))
    }

    /// Extracts the inclusion path for the leaf at `index`.
    pub fn path(&self, index: usize) -> Result<MerkleInclusionPath, Error> {
        let leaf_count = self.leaf_count();
        let tx_index = u32::try_from(index)
            .ok()
            .filter(|_| index < leaf_count)
            .ok_or(Error::IndexOutOfRange { index, leaf_count })?;

        let mut nodes = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut pos = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = level.get(pos ^ 1).unwrap_or(&level[pos]);
            nodes.push(TxMerkleNode::from_byte_array(*sibling));
            pos >>= 1;
        }

        Ok(MerkleInclusionPath { nodes, tx_index })
    }
}

/// Returns true if `path` leads from `txid` to `expected_root`.
pub fn verify_merkle_path(
    txid: &Txid,
    path: &MerkleInclusionPath,
    expected_root: &TxMerkleNode,
) -> bool {
    let nodes: Vec<[u8; 32]> = path
        .nodes
        .iter()
        .map(|node| node.to_byte_array())
        .collect();
    verify_merkle_path_with_hasher(
        txid.to_byte_array(),
        &nodes,
        path.tx_index,
        expected_root.to_byte_array(),
        &BitcoinMerkleHasher,
    )
}

/// Recomputes the root from a leaf and its siblings using a caller-provided
/// hasher. Bit `i` of `index` selects whether the running hash is the right
/// child at level `i`; any bits above the path length make the path invalid.
pub fn verify_merkle_path_with_hasher<H: MerkleHasher>(
    leaf: [u8; 32],
    nodes: &[[u8; 32]],
    index: u32,
    expected_root: [u8; 32],
    hasher: &H,
) -> bool {
    let mut current = leaf;
    let mut index = index as u64;
    for node in nodes {
        current = if index & 1 == 1 {
            hasher.hash_nodes(*node, current)
        } else {
            hasher.hash_nodes(current, *node)
        };
        index >>= 1;
    }

    index == 0 && current == expected_root
}
