//! The asset commitment as seen by the proof layer.
//!
//! The asset tree itself lives outside this workspace. All the proof layer
//! needs from it is the tapscript root it contributes to a Taproot output.

use bitcoin::hashes::Hash;
use bitcoin::taproot::TapNodeHash;
use serde::{Deserialize, Serialize};

/// Source of the tapscript root that an asset commitment folds into an
/// output key.
pub trait TaroCommitment {
    /// Returns the tapscript root of the commitment, optionally hashed
    /// together with a tapscript sibling.
    fn tapscript_root(&self, sibling: Option<&TapNodeHash>) -> TapNodeHash;
}

impl<T: TaroCommitment + ?Sized> TaroCommitment for &T {
    fn tapscript_root(&self, sibling: Option<&TapNodeHash>) -> TapNodeHash {
        (**self).tapscript_root(sibling)
    }
}

/// A commitment known only by its 32-byte root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentRoot(pub TapNodeHash);

impl CommitmentRoot {
    /// Wraps raw root bytes.
    pub fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(TapNodeHash::from_byte_array(bytes))
    }

    /// Returns the raw root bytes.
    pub fn to_byte_array(self) -> [u8; 32] {
        self.0.to_byte_array()
    }
}

impl From<TapNodeHash> for CommitmentRoot {
    fn from(hash: TapNodeHash) -> Self {
        Self(hash)
    }
}

impl TaroCommitment for CommitmentRoot {
    fn tapscript_root(&self, sibling: Option<&TapNodeHash>) -> TapNodeHash {
        tap_branch(self.0, sibling)
    }
}

/// Combines a commitment root with an optional sibling into the effective
/// tapscript root.
///
/// Children are ordered lexicographically before hashing (BIP-341
/// TapBranch), so the result does not depend on which side the sibling was
/// given on.
pub fn tap_branch(root: TapNodeHash, sibling: Option<&TapNodeHash>) -> TapNodeHash {
    match sibling {
        Some(sibling) => TapNodeHash::from_node_hashes(root, *sibling),
        None => root,
    }
}
