//! Minting blob construction.

use alloc::vec::Vec;

use bitcoin::OutPoint;
use taro_proof_types::commitment::TaroCommitment;
use taro_proof_types::mint::MintingBlob;

use crate::assemble::{assemble_base_proof, BaseProofParams};
use crate::config::ProofConfig;
use crate::verify::mint::check_genesis_point;
use crate::{Result, TaprootOps};

/// Inputs to [`new_minting_blobs`].
#[derive(Debug, Clone)]
pub struct MintParams<'a, C: ?Sized> {
    /// Base proof inputs for the anchor transaction.
    pub base: BaseProofParams<'a, C>,
    /// Outpoint the anchor transaction's first input must spend.
    pub genesis_point: OutPoint,
}

/// Builds the minting blob for a genesis anchor transaction.
///
/// The genesis binding is checked before any proof is assembled; assembler
/// errors are returned unchanged.
pub fn build_minting_blob<O, C>(
    ops: &O,
    config: &ProofConfig,
    params: &MintParams<'_, C>,
) -> Result<MintingBlob>
where
    O: TaprootOps,
    C: TaroCommitment + ?Sized,
{
    check_genesis_point(params.base.tx, &params.genesis_point)?;
    let proof = assemble_base_proof(ops, config, &params.base)?;
    Ok(MintingBlob {
        genesis_point: params.genesis_point,
        proof,
    })
}

/// Builds and serializes the minting blob for a genesis anchor transaction.
pub fn new_minting_blobs<O, C>(
    ops: &O,
    config: &ProofConfig,
    params: &MintParams<'_, C>,
) -> Result<Vec<u8>>
where
    O: TaprootOps,
    C: TaroCommitment + ?Sized,
{
    let blob = build_minting_blob(ops, config, params)?;
    let bytes = blob.to_bytes()?;
    log::debug!(
        "minting blob for genesis {} is {} bytes",
        params.genesis_point,
        bytes.len()
    );
    Ok(bytes)
}
