//! Anchor transaction verification helpers.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use bitcoin::block::Header;
use bitcoin::{Block, BlockHash, Transaction, Txid};
use taro_proof_types::proof::MerkleInclusionPath;
use thiserror::Error;

use crate::merkle::{self, verify_merkle_path, MerkleTree};

/// Errors returned by anchor transaction verification helpers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The anchor transaction is not part of the block.
    #[error("tx {txid} not found in block")]
    TxNotInBlock {
        /// Transaction ID that was searched for.
        txid: Txid,
    },
    /// The caller's transaction index disagrees with the block contents.
    #[error("tx index {claimed} does not match block position {actual}")]
    TxIndexMismatch {
        /// Index supplied by the caller.
        claimed: usize,
        /// Position of the transaction in the block.
        actual: usize,
    },
    /// The merkle path does not lead to the header's merkle root.
    #[error("invalid transaction merkle path")]
    InvalidMerklePath,
    /// The merkle path is deeper than allowed.
    #[error("merkle path depth {depth} exceeds limit {limit}")]
    MerklePathTooLong {
        /// Number of nodes in the path.
        depth: usize,
        /// Configured maximum depth.
        limit: u16,
    },
    /// The block's transactions do not hash to the header's merkle root.
    #[error("block header merkle root does not match its transactions")]
    MerkleRootMismatch,
    /// The block header failed verification.
    #[error("invalid block header")]
    InvalidBlockHeader,
    /// Merkle tree construction failed.
    #[error(transparent)]
    Merkle(#[from] merkle::Error),
}

/// Trait for deciding whether a block header belongs to the chain.
pub trait HeaderVerifier {
    /// Returns true if the header is known to the caller.
    fn verify_header(&self, header: &Header) -> bool;
}

impl<F> HeaderVerifier for F
where
    F: Fn(&Header) -> bool,
{
    fn verify_header(&self, header: &Header) -> bool {
        self(header)
    }
}

impl HeaderVerifier for BTreeSet<BlockHash> {
    /// Accepts headers whose hash is in the set.
    fn verify_header(&self, header: &Header) -> bool {
        self.contains(&header.block_hash())
    }
}

/// Locates `tx` in `block`, checks it sits at `tx_index` and that the block's
/// transactions commit to the header, then returns the inclusion path.
pub fn locate_tx_in_block(
    block: &Block,
    tx: &Transaction,
    tx_index: usize,
) -> Result<MerkleInclusionPath, Error> {
    let txid = tx.compute_txid();
    let txids: Vec<Txid> = block.txdata.iter().map(Transaction::compute_txid).collect();
    if txids.is_empty() {
        return Err(Error::TxNotInBlock { txid });
    }

    let tree = MerkleTree::build(&txids)?;
    let actual = tree.position(&txid).ok_or(Error::TxNotInBlock { txid })?;
    if actual != tx_index {
        return Err(Error::TxIndexMismatch {
            claimed: tx_index,
            actual,
        });
    }

    if tree.root() != block.header.merkle_root {
        return Err(Error::MerkleRootMismatch);
    }

    Ok(tree.path(actual)?)
}

/// Verifies that `tx` is committed to by `header` via `path`, and that the
/// header is accepted by `verifier`.
pub fn verify_tx_in_block<H: HeaderVerifier + ?Sized>(
    header: &Header,
    tx: &Transaction,
    path: &MerkleInclusionPath,
    verifier: &H,
    max_depth: u16,
) -> Result<(), Error> {
    if path.nodes.len() > max_depth as usize {
        return Err(Error::MerklePathTooLong {
            depth: path.nodes.len(),
            limit: max_depth,
        });
    }

    if !verify_merkle_path(&tx.compute_txid(), path, &header.merkle_root) {
        return Err(Error::InvalidMerklePath);
    }

    if !verifier.verify_header(header) {
        return Err(Error::InvalidBlockHeader);
    }

    Ok(())
}
