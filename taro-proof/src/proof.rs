//! Host-side proof construction backed by bitcoin/secp256k1.

use bitcoin::TapNodeHash;
use taro_proof_core::assemble::{self, BaseProofParams};
use taro_proof_core::config::ProofConfig;
use taro_proof_core::mint::{self, MintParams};
use taro_proof_core::{key, Result};
use taro_proof_types::commitment::TaroCommitment;
use taro_proof_types::key::SerializedKey;
use taro_proof_types::proof::Proof;

use crate::BitcoinTaprootOps;

/// Derives the x-only Taproot output key for an internal key and optional
/// tapscript root.
pub fn derive_output_key(
    internal_key: &SerializedKey,
    tapscript_root: Option<TapNodeHash>,
) -> Result<[u8; 32]> {
    let ops = BitcoinTaprootOps::new();
    Ok(key::derive_output_key(&ops, internal_key, tapscript_root)?)
}

/// Assembles a base proof using the bitcoin backend.
pub fn assemble_base_proof<C: TaroCommitment + ?Sized>(
    config: &ProofConfig,
    params: &BaseProofParams<'_, C>,
) -> Result<Proof> {
    let ops = BitcoinTaprootOps::new();
    assemble::assemble_base_proof(&ops, config, params)
}

/// Builds and serializes a minting blob using the bitcoin backend.
pub fn new_minting_blobs<C: TaroCommitment + ?Sized>(
    config: &ProofConfig,
    params: &MintParams<'_, C>,
) -> Result<Vec<u8>> {
    let ops = BitcoinTaprootOps::new();
    mint::new_minting_blobs(&ops, config, params)
}
