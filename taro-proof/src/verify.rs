//! Host-side verification utilities backed by bitcoin/secp256k1.

use rayon::prelude::*;
use taro_proof_core::config::ProofConfig;
use taro_proof_core::verify::{self, HeaderVerifier, VerifiedProof};
use taro_proof_core::Result;

use crate::BitcoinTaprootOps;

/// Decodes and verifies a proof blob using the bitcoin backend.
pub fn verify_proof_blob<H: HeaderVerifier + ?Sized>(
    config: &ProofConfig,
    bytes: &[u8],
    headers: &H,
) -> Result<VerifiedProof> {
    let ops = BitcoinTaprootOps::new();
    verify::proof::verify_proof_blob(&ops, config, bytes, headers)
}

/// Decodes and verifies a minting blob using the bitcoin backend.
pub fn verify_minting_blob<H: HeaderVerifier + ?Sized>(
    config: &ProofConfig,
    bytes: &[u8],
    headers: &H,
) -> Result<VerifiedProof> {
    let ops = BitcoinTaprootOps::new();
    verify::mint::verify_minting_blob_bytes(&ops, config, bytes, headers)
}

/// Verifies many minting blobs in parallel.
///
/// Returns one result per blob, in input order. A rejected blob does not
/// affect the others.
pub fn verify_minting_blobs_batch<B, H>(
    config: &ProofConfig,
    blobs: &[B],
    headers: &H,
) -> Vec<Result<VerifiedProof>>
where
    B: AsRef<[u8]> + Sync,
    H: HeaderVerifier + Sync + ?Sized,
{
    let ops = BitcoinTaprootOps::new();
    log::debug!("verifying {} minting blobs", blobs.len());

    blobs
        .par_iter()
        .enumerate()
        .map(|(idx, blob)| {
            let result =
                verify::mint::verify_minting_blob_bytes(&ops, config, blob.as_ref(), headers);
            if let Err(err) = &result {
                log::warn!("minting blob {} rejected ({}): {}", idx, err.kind(), err);
            }
            result
        })
        .collect()
}
