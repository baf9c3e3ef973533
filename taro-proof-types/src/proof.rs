// --- Proof records and their blob encoding ---

use alloc::vec::Vec;
use bitcoin::block::Header;
use bitcoin::hashes::Hash;
use bitcoin::taproot::TapNodeHash;
use bitcoin::{Transaction, TxMerkleNode, Txid};
use serde::{Deserialize, Serialize};

use crate::codec::{self, DecodeLimits, Reader};
use crate::commitment::tap_branch;
use crate::error::Error;
use crate::key::SerializedKey;

/// Blob version written by this implementation.
pub const BLOB_VERSION: u8 = 0;

/// Wire tag of a per-output Taproot proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProofKind {
    /// Key-path-only output, no script commitment.
    Bip86 = 0,
    /// Commitment root hashed together with one sibling branch.
    CommitmentWithSibling = 1,
    /// Commitment root used directly as the tapscript root.
    Commitment = 2,
}

impl ProofKind {
    pub(crate) fn from_u8(val: u8) -> Result<Self, Error> {
        match val {
            0 => Ok(ProofKind::Bip86),
            1 => Ok(ProofKind::CommitmentWithSibling),
            2 => Ok(ProofKind::Commitment),
            _ => Err(Error::UnknownProofKind(val)),
        }
    }
}

/// How the tapscript root of an output is revealed. Exactly one shape is
/// active per proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapscriptProof {
    /// BIP-86 output: the internal key is tweaked with no script root.
    Bip86,
    /// The output commits to `root`, optionally combined with a sibling
    /// branch hash before tweaking.
    Commitment {
        /// Root of the commitment carried by the output.
        root: TapNodeHash,
        /// Sibling branch hashed together with `root`.
        sibling: Option<TapNodeHash>,
    },
}

impl TapscriptProof {
    /// Returns the wire tag for this shape.
    pub fn kind(&self) -> ProofKind {
        match self {
            TapscriptProof::Bip86 => ProofKind::Bip86,
            TapscriptProof::Commitment {
                sibling: Some(_), ..
            } => ProofKind::CommitmentWithSibling,
            TapscriptProof::Commitment { sibling: None, .. } => ProofKind::Commitment,
        }
    }

    /// Returns the revealed commitment root, if any.
    pub fn commitment_root(&self) -> Option<TapNodeHash> {
        match self {
            TapscriptProof::Bip86 => None,
            TapscriptProof::Commitment { root, .. } => Some(*root),
        }
    }

    /// Returns the root the internal key is tweaked with: none for BIP-86,
    /// otherwise the commitment root folded with its sibling.
    pub fn tapscript_root(&self) -> Option<TapNodeHash> {
        match self {
            TapscriptProof::Bip86 => None,
            TapscriptProof::Commitment { root, sibling } => {
                Some(tap_branch(*root, sibling.as_ref()))
            }
        }
    }
}

/// A claim about the contents of one output of the anchor transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaprootProof {
    /// Index of the output the proof applies to.
    pub output_index: u32,

    /// Internal key of the Taproot output at `output_index`.
    pub internal_key: SerializedKey,

    /// How the output's tapscript root is revealed.
    pub tapscript_proof: TapscriptProof,
}

impl TaprootProof {
    /// Builds a BIP-86 proof for an output.
    pub fn bip86(output_index: u32, internal_key: SerializedKey) -> Self {
        TaprootProof {
            output_index,
            internal_key,
            tapscript_proof: TapscriptProof::Bip86,
        }
    }

    /// Builds a commitment proof for an output.
    pub fn commitment(
        output_index: u32,
        internal_key: SerializedKey,
        root: TapNodeHash,
        sibling: Option<TapNodeHash>,
    ) -> Self {
        TaprootProof {
            output_index,
            internal_key,
            tapscript_proof: TapscriptProof::Commitment { root, sibling },
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        codec::write_u16(out, "output index", self.output_index as usize)?;
        out.push(self.tapscript_proof.kind() as u8);
        out.extend_from_slice(&self.internal_key.bytes);
        if let TapscriptProof::Commitment { root, sibling } = &self.tapscript_proof {
            out.extend_from_slice(&root.to_byte_array());
            if let Some(sibling) = sibling {
                out.extend_from_slice(&sibling.to_byte_array());
            }
        }
        Ok(())
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        let output_index = r.read_u16("output index")? as u32;
        let kind = ProofKind::from_u8(r.read_u8("proof kind")?)?;
        let internal_key = SerializedKey::new(r.read_array("internal key")?);
        let tapscript_proof = match kind {
            ProofKind::Bip86 => TapscriptProof::Bip86,
            ProofKind::CommitmentWithSibling => TapscriptProof::Commitment {
                root: TapNodeHash::from_byte_array(r.read_array("commitment root")?),
                sibling: Some(TapNodeHash::from_byte_array(r.read_array("sibling")?)),
            },
            ProofKind::Commitment => TapscriptProof::Commitment {
                root: TapNodeHash::from_byte_array(r.read_array("commitment root")?),
                sibling: None,
            },
        };

        Ok(TaprootProof {
            output_index,
            internal_key,
            tapscript_proof,
        })
    }
}

/// A Merkle path proving a transaction is included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleInclusionPath {
    /// Sibling hashes from the transaction's level up to just below the root.
    pub nodes: Vec<TxMerkleNode>,

    /// Position of the transaction in the block. Bit `i` tells whether the
    /// running hash is the right child at level `i`.
    pub tx_index: u32,
}

/// A self-contained proof that an output of a confirmed transaction carries
/// an asset commitment and that no other output of that transaction does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Blob version this proof was encoded with.
    pub version: u8,

    /// Header of the block that confirms `tx`.
    pub block_header: Header,

    /// The anchor transaction.
    pub tx: Transaction,

    /// Inclusion path of `tx` under `block_header.merkle_root`.
    pub merkle_path: MerkleInclusionPath,

    /// The inclusion proof followed by one exclusion proof per other
    /// output, in output-index order.
    pub taproot_proofs: Vec<TaprootProof>,
}

impl Proof {
    /// Returns the txid of the anchor transaction.
    pub fn txid(&self) -> Txid {
        self.tx.compute_txid()
    }

    /// Returns the proof for the output that carries the commitment.
    pub fn inclusion_proof(&self) -> Option<&TaprootProof> {
        self.taproot_proofs.first()
    }

    /// Returns the proofs for every other output.
    pub fn exclusion_proofs(&self) -> &[TaprootProof] {
        self.taproot_proofs.get(1..).unwrap_or(&[])
    }

    /// Encodes the proof into its blob layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// Decodes a proof blob with default limits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_bytes_with_limits(bytes, &DecodeLimits::default())
    }

    /// Decodes a proof blob, rejecting anything outside `limits`.
    pub fn from_bytes_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Result<Self, Error> {
        if bytes.len() > limits.max_blob_bytes {
            return Err(Error::BlobTooLarge {
                actual: bytes.len(),
                limit: limits.max_blob_bytes,
            });
        }
        let mut reader = Reader::new(bytes);
        let proof = Self::decode(&mut reader, limits)?;
        reader.finish()?;
        Ok(proof)
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        out.push(self.version);
        codec::write_header(out, &self.block_header);
        codec::write_tx(out, &self.tx);

        codec::write_u16(out, "merkle path", self.merkle_path.nodes.len())?;
        for node in &self.merkle_path.nodes {
            out.extend_from_slice(&node.to_byte_array());
        }
        codec::write_u32(out, self.merkle_path.tx_index);

        codec::write_u16(out, "taproot proofs", self.taproot_proofs.len())?;
        for proof in &self.taproot_proofs {
            proof.encode_into(out)?;
        }
        Ok(())
    }

    pub(crate) fn decode(r: &mut Reader<'_>, limits: &DecodeLimits) -> Result<Self, Error> {
        let version = r.read_u8("version")?;
        if version != limits.version {
            return Err(Error::UnsupportedVersion {
                expected: limits.version,
                actual: version,
            });
        }

        let block_header = r.read_header()?;
        let tx = r.read_tx()?;

        let node_count = r.read_u16("merkle path length")? as usize;
        codec::check_count("merkle path", node_count, limits.max_merkle_depth)?;
        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            nodes.push(TxMerkleNode::from_byte_array(r.read_array("merkle node")?));
        }
        let tx_index = r.read_u32("tx index")?;

        let proof_count = r.read_u16("taproot proof count")? as usize;
        codec::check_count("taproot proofs", proof_count, limits.max_taproot_proofs)?;
        // Each entry is at least 36 bytes; don't trust the count for allocation.
        let mut taproot_proofs = Vec::with_capacity(proof_count.min(r.remaining() / 36));
        for _ in 0..proof_count {
            taproot_proofs.push(TaprootProof::decode(r)?);
        }

        Ok(Proof {
            version,
            block_header,
            tx,
            merkle_path: MerkleInclusionPath { nodes, tx_index },
            taproot_proofs,
        })
    }
}
