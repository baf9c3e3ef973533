//! Base proof assembly.

use alloc::vec::Vec;

use bitcoin::taproot::TapNodeHash;
use bitcoin::{Block, Transaction};
use taro_proof_types::commitment::TaroCommitment;
use taro_proof_types::key::SerializedKey;
use taro_proof_types::proof::{Proof, TaprootProof};

use crate::config::ProofConfig;
use crate::verify::proof::{self, check_exclusion_coverage};
use crate::verify::taproot_proof::{verify_taproot_proof, ProofStage};
use crate::verify::tx::{self, locate_tx_in_block};
use crate::{Result, TaprootOps};

/// Inputs to [`assemble_base_proof`].
#[derive(Debug, Clone)]
pub struct BaseProofParams<'a, C: ?Sized> {
    /// Block containing the anchor transaction.
    pub block: &'a Block,
    /// Anchor transaction.
    pub tx: &'a Transaction,
    /// Position of `tx` in `block.txdata`.
    pub tx_index: usize,
    /// Output of `tx` carrying the asset commitment.
    pub output_index: u32,
    /// Internal key of the asset output.
    pub internal_key: SerializedKey,
    /// Asset commitment placed in the output's tapscript tree.
    pub taro_root: &'a C,
    /// Optional sibling hashed alongside the commitment.
    pub tapscript_sibling: Option<TapNodeHash>,
    /// One proof for every other output of `tx`, in any order.
    pub exclusion_proofs: Vec<TaprootProof>,
}

/// Assembles a base proof for an asset anchored in `params.tx`.
///
/// Either every check passes and a complete proof is returned, or the first
/// failing check is reported and nothing is produced. Exclusion proofs are
/// emitted in output-index order after the inclusion proof.
pub fn assemble_base_proof<O, C>(
    ops: &O,
    config: &ProofConfig,
    params: &BaseProofParams<'_, C>,
) -> Result<Proof>
where
    O: TaprootOps,
    C: TaroCommitment + ?Sized,
{
    config.validate()?;

    let output_count = params.tx.output.len();
    if params.output_index as usize >= output_count {
        return Err(proof::Error::OutputIndexInvalid {
            index: params.output_index,
            output_count,
        }
        .into());
    }
    check_exclusion_coverage(params.output_index, output_count, &params.exclusion_proofs)?;

    let count = params.exclusion_proofs.len() + 1;
    if count > config.max_taproot_proofs as usize {
        return Err(proof::Error::TooManyTaprootProofs {
            count,
            limit: config.max_taproot_proofs,
        }
        .into());
    }

    let commitment_root = params.taro_root.tapscript_root(None);
    let inclusion = TaprootProof::commitment(
        params.output_index,
        params.internal_key,
        commitment_root,
        params.tapscript_sibling,
    );
    verify_taproot_proof(
        ops,
        params.tx,
        &inclusion,
        commitment_root,
        ProofStage::Inclusion,
    )
    .map_err(|source| proof::Error::TaprootProof {
        stage: ProofStage::Inclusion,
        source,
    })?;
    log::debug!("inclusion proof for output {} verified", params.output_index);

    let mut exclusions = params.exclusion_proofs.clone();
    exclusions.sort_by_key(|proof| proof.output_index);
    for exclusion in &exclusions {
        verify_taproot_proof(
            ops,
            params.tx,
            exclusion,
            commitment_root,
            ProofStage::Exclusion,
        )
        .map_err(|source| proof::Error::TaprootProof {
            stage: ProofStage::Exclusion,
            source,
        })?;
        log::trace!("exclusion proof for output {} verified", exclusion.output_index);
    }

    let merkle_path = locate_tx_in_block(params.block, params.tx, params.tx_index)?;
    if merkle_path.nodes.len() > config.max_merkle_depth as usize {
        return Err(tx::Error::MerklePathTooLong {
            depth: merkle_path.nodes.len(),
            limit: config.max_merkle_depth,
        }
        .into());
    }
    log::debug!(
        "tx {} located at index {} with {} merkle nodes",
        params.tx.compute_txid(),
        params.tx_index,
        merkle_path.nodes.len()
    );

    let mut taproot_proofs = Vec::with_capacity(count);
    taproot_proofs.push(inclusion);
    taproot_proofs.extend(exclusions);

    Ok(Proof {
        version: config.blob_version,
        block_header: params.block.header,
        tx: params.tx.clone(),
        merkle_path,
        taproot_proofs,
    })
}
