//! Taproot proof verification helpers.

use bitcoin::secp256k1::XOnlyPublicKey;
use bitcoin::taproot::TapNodeHash;
use bitcoin::{Script, Transaction};
use taro_proof_types::commitment::tap_branch;
use taro_proof_types::proof::{TaprootProof, TapscriptProof};

use crate::key::derive_output_key;
use crate::{OpsError, TaprootOps};

/// Errors returned by taproot proof verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Taproot output index is invalid.
    InvalidTaprootOutputIndex {
        /// Index requested in the anchor transaction outputs.
        output_index: u32,
        /// Total number of outputs in the anchor transaction.
        output_count: usize,
    },
    /// Script pubkey is not a Taproot v1 witness program.
    InvalidTaprootWitnessProgram,
    /// Taproot output key bytes are invalid.
    InvalidTaprootOutputKey,
    /// An inclusion proof must reveal a commitment, not a BIP-86 output.
    MissingCommitment,
    /// The inclusion proof reveals a commitment other than the asset's.
    CommitmentRootMismatch,
    /// An exclusion proof reveals the asset's own commitment.
    ExclusionCommitsToAsset,
    /// Taproot proof derived key does not match the anchor output.
    InvalidTaprootProof,
    /// Taproot operation failed.
    Ops(OpsError),
}

impl From<OpsError> for Error {
    /// Converts an ops error into a taproot proof error.
    fn from(err: OpsError) -> Self {
        Self::Ops(err)
    }
}

impl core::fmt::Display for Error {
    /// Formats the error for display.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidTaprootOutputIndex {
                output_index,
                output_count,
            } => write!(
                f,
                "invalid taproot output index {} for {} outputs",
                output_index, output_count
            ),
            Error::InvalidTaprootWitnessProgram => {
                write!(f, "script pubkey is not a Taproot v1 witness program")
            }
            Error::InvalidTaprootOutputKey => write!(f, "invalid taproot output key"),
            Error::MissingCommitment => {
                write!(f, "inclusion proof does not reveal a commitment")
            }
            Error::CommitmentRootMismatch => {
                write!(f, "inclusion proof commits to a different root")
            }
            Error::ExclusionCommitsToAsset => {
                write!(f, "exclusion proof commits to the asset")
            }
            Error::InvalidTaprootProof => write!(f, "invalid taproot proof"),
            Error::Ops(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for Error {}

/// Role a taproot proof plays within a base proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofStage {
    /// The output that carries the asset commitment.
    Inclusion,
    /// Any other output of the anchor transaction.
    Exclusion,
}

impl core::fmt::Display for ProofStage {
    /// Formats the stage for display.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProofStage::Inclusion => write!(f, "inclusion"),
            ProofStage::Exclusion => write!(f, "exclusion"),
        }
    }
}

/// Extracts the taproot output key from an anchor transaction output.
pub fn extract_taproot_key(tx: &Transaction, output_index: u32) -> Result<[u8; 32], Error> {
    let output_count = tx.output.len();
    let output = tx
        .output
        .get(output_index as usize)
        .ok_or(Error::InvalidTaprootOutputIndex {
            output_index,
            output_count,
        })?;

    extract_taproot_key_from_script(output.script_pubkey.as_script())
}

/// Extracts the taproot output key from a script pubkey.
pub fn extract_taproot_key_from_script(script: &Script) -> Result<[u8; 32], Error> {
    if !script.is_p2tr() {
        return Err(Error::InvalidTaprootWitnessProgram);
    }

    let key = XOnlyPublicKey::from_slice(&script.as_bytes()[2..34])
        .map_err(|_| Error::InvalidTaprootOutputKey)?;
    Ok(key.serialize())
}

/// Recomputes the output key a taproot proof claims.
pub fn derive_taproot_key<O: TaprootOps>(ops: &O, proof: &TaprootProof) -> Result<[u8; 32], Error> {
    let root = proof.tapscript_proof.tapscript_root();
    Ok(derive_output_key(ops, &proof.internal_key, root)?)
}

/// Verifies a taproot proof against the anchor transaction output it names
/// and returns the matched output key.
///
/// `asset_root` is the commitment root of the asset being proven. An
/// inclusion proof must reveal exactly that root; an exclusion proof must
/// reveal anything but it.
pub fn verify_taproot_proof<O: TaprootOps>(
    ops: &O,
    tx: &Transaction,
    proof: &TaprootProof,
    asset_root: TapNodeHash,
    stage: ProofStage,
) -> Result<[u8; 32], Error> {
    let expected_key = extract_taproot_key(tx, proof.output_index)?;
    verify_taproot_proof_with_key(ops, expected_key, proof, asset_root, stage)
}

/// Verifies a taproot proof against an expected x-only output key.
pub fn verify_taproot_proof_with_key<O: TaprootOps>(
    ops: &O,
    expected_key: [u8; 32],
    proof: &TaprootProof,
    asset_root: TapNodeHash,
    stage: ProofStage,
) -> Result<[u8; 32], Error> {
    match (stage, &proof.tapscript_proof) {
        (ProofStage::Inclusion, TapscriptProof::Bip86) => return Err(Error::MissingCommitment),
        (ProofStage::Inclusion, TapscriptProof::Commitment { root, .. }) if *root != asset_root => {
            return Err(Error::CommitmentRootMismatch)
        }
        (ProofStage::Exclusion, TapscriptProof::Commitment { root, sibling })
            if *root == asset_root || *sibling == Some(asset_root) =>
        {
            return Err(Error::ExclusionCommitsToAsset)
        }
        _ => {}
    }

    let derived = derive_taproot_key(ops, proof)?;
    if stage == ProofStage::Exclusion && derives_asset_key(ops, proof, asset_root, derived)? {
        return Err(Error::ExclusionCommitsToAsset);
    }
    if derived != expected_key {
        log::trace!(
            "{} proof for output {} derives a different key",
            stage,
            proof.output_index
        );
        return Err(Error::InvalidTaprootProof);
    }

    Ok(derived)
}

/// Returns true if `derived` is the key the proof's internal key would carry
/// when committing to `asset_root`, alone or branched with a revealed node.
fn derives_asset_key<O: TaprootOps>(
    ops: &O,
    proof: &TaprootProof,
    asset_root: TapNodeHash,
    derived: [u8; 32],
) -> Result<bool, Error> {
    let mut candidates = [Some(asset_root), None, None];
    if let TapscriptProof::Commitment { root, sibling } = &proof.tapscript_proof {
        candidates[1] = Some(tap_branch(asset_root, Some(root)));
        candidates[2] = sibling.map(|sibling| tap_branch(asset_root, Some(&sibling)));
    }

    for root in candidates.into_iter().flatten() {
        if derive_output_key(ops, &proof.internal_key, Some(root))? == derived {
            return Ok(true);
        }
    }
    Ok(false)
}
