//! Minting blob verification helpers.

use bitcoin::{OutPoint, Transaction};
use taro_proof_types::mint::MintingBlob;
use thiserror::Error;

use crate::config::ProofConfig;
use crate::verify::proof::{verify_proof_inner, VerifiedProof};
use crate::verify::tx::HeaderVerifier;
use crate::TaprootOps;

/// Errors returned by genesis binding checks.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The anchor transaction has no inputs.
    #[error("anchor tx has no inputs")]
    MissingGenesisInput,
    /// The first input does not spend the genesis point.
    #[error("genesis point {expected} does not match first input {actual}")]
    GenesisPointMismatch {
        /// Genesis point claimed for the asset.
        expected: OutPoint,
        /// Previous outpoint of the anchor transaction's first input.
        actual: OutPoint,
    },
}

/// Checks that the first input of `tx` spends `genesis_point`.
pub fn check_genesis_point(tx: &Transaction, genesis_point: &OutPoint) -> Result<(), Error> {
    let first = tx.input.first().ok_or(Error::MissingGenesisInput)?;
    if first.previous_output != *genesis_point {
        return Err(Error::GenesisPointMismatch {
            expected: *genesis_point,
            actual: first.previous_output,
        });
    }
    Ok(())
}

/// Verifies a decoded minting blob: the genesis binding first, then the
/// embedded proof.
pub fn verify_minting_blob<O, H>(
    ops: &O,
    config: &ProofConfig,
    blob: &MintingBlob,
    headers: &H,
) -> crate::Result<VerifiedProof>
where
    O: TaprootOps,
    H: HeaderVerifier + ?Sized,
{
    config.validate()?;
    check_genesis_point(&blob.proof.tx, &blob.genesis_point)?;
    Ok(verify_proof_inner(ops, config, &blob.proof, headers)?)
}

/// Decodes and verifies a minting blob.
pub fn verify_minting_blob_bytes<O, H>(
    ops: &O,
    config: &ProofConfig,
    bytes: &[u8],
    headers: &H,
) -> crate::Result<VerifiedProof>
where
    O: TaprootOps,
    H: HeaderVerifier + ?Sized,
{
    config.validate()?;
    let blob = MintingBlob::from_bytes_with_limits(bytes, &config.decode_limits())?;
    verify_minting_blob(ops, config, &blob, headers)
}
