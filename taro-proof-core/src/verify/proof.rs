//! Proof-level verification helpers.

use alloc::collections::BTreeSet;

use bitcoin::taproot::TapNodeHash;
use bitcoin::{BlockHash, Txid};
use serde::{Deserialize, Serialize};
use taro_proof_types::commitment::TaroCommitment;
use taro_proof_types::proof::{Proof, TaprootProof};
use thiserror::Error;

use crate::config::ProofConfig;
use crate::verify::taproot_proof::{self, verify_taproot_proof, ProofStage};
use crate::verify::tx::{self, verify_tx_in_block, HeaderVerifier};
use crate::TaprootOps;

/// Errors returned by proof verification helpers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The proof carries a version this configuration does not accept.
    #[error("unsupported proof version {actual}, expected {expected}")]
    UnsupportedVersion {
        /// Configured version.
        expected: u8,
        /// Version found in the proof.
        actual: u8,
    },
    /// The proof has no taproot proofs at all.
    #[error("missing inclusion proof")]
    MissingInclusionProof,
    /// The asset output index does not exist in the anchor transaction.
    #[error("output index {index} invalid for {output_count} outputs")]
    OutputIndexInvalid {
        /// Claimed output index.
        index: u32,
        /// Total number of outputs in the transaction.
        output_count: usize,
    },
    /// More taproot proofs than the configuration allows.
    #[error("{count} taproot proofs exceed limit {limit}")]
    TooManyTaprootProofs {
        /// Number of taproot proofs.
        count: usize,
        /// Configured limit.
        limit: u16,
    },
    /// Exclusion proofs are not sorted by output index.
    #[error("exclusion proofs are not in output order")]
    UnorderedExclusionProofs,
    /// A non-asset output has no exclusion proof.
    #[error("missing exclusion proof for output {output_index}")]
    MissingExclusionProof {
        /// Output lacking a proof.
        output_index: u32,
    },
    /// An output has more than one exclusion proof.
    #[error("duplicate exclusion proof for output {output_index}")]
    DuplicateExclusionProof {
        /// Output proven more than once.
        output_index: u32,
    },
    /// An exclusion proof names the asset output or a missing output.
    #[error("unexpected exclusion proof for output {output_index}")]
    UnexpectedExclusionProof {
        /// Output named by the stray proof.
        output_index: u32,
    },
    /// Taproot proof verification failed at a specific stage.
    #[error("{stage} proof: {source}")]
    TaprootProof {
        /// Stage where verification failed.
        stage: ProofStage,
        /// Underlying taproot proof error.
        source: taproot_proof::Error,
    },
    /// Anchor transaction verification failed.
    #[error(transparent)]
    Tx(#[from] tx::Error),
}

impl Error {
    fn at(stage: ProofStage) -> impl Fn(taproot_proof::Error) -> Self {
        move |source| Error::TaprootProof { stage, source }
    }
}

/// Facts established by a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedProof {
    /// Anchor transaction ID.
    pub txid: Txid,
    /// Hash of the block committing to the anchor transaction.
    pub block_hash: BlockHash,
    /// Output carrying the asset commitment.
    pub output_index: u32,
    /// X-only output key of that output.
    pub output_key: [u8; 32],
    /// Commitment root revealed by the inclusion proof.
    pub commitment_root: TapNodeHash,
}

/// Checks that `exclusions` name every output of the anchor transaction
/// other than `asset_index`, each exactly once.
pub fn check_exclusion_coverage(
    asset_index: u32,
    output_count: usize,
    exclusions: &[TaprootProof],
) -> Result<(), Error> {
    let mut seen = BTreeSet::new();
    for proof in exclusions {
        let idx = proof.output_index;
        if idx == asset_index || idx as usize >= output_count {
            return Err(Error::UnexpectedExclusionProof { output_index: idx });
        }
        if !seen.insert(idx) {
            return Err(Error::DuplicateExclusionProof { output_index: idx });
        }
    }

    // output_count fits in u32 here: every index above was below it.
    for idx in (0..output_count).map(|idx| idx as u32) {
        if idx != asset_index && !seen.contains(&idx) {
            return Err(Error::MissingExclusionProof { output_index: idx });
        }
    }

    Ok(())
}

/// Verifies a decoded proof against the block headers known to `headers`.
///
/// Checks run in a fixed order and the first failure is returned: version,
/// structure, exclusion coverage, the inclusion proof, each exclusion proof,
/// then the Merkle path and header.
///
/// The proof itself only binds the header's merkle root. Every other header
/// field is bound by `headers`; a verifier that accepts any header accepts a
/// changed nonce, time or previous block hash.
pub fn verify_proof<O, H>(
    ops: &O,
    config: &ProofConfig,
    proof: &Proof,
    headers: &H,
) -> crate::Result<VerifiedProof>
where
    O: TaprootOps,
    H: HeaderVerifier + ?Sized,
{
    config.validate()?;
    Ok(verify_proof_inner(ops, config, proof, headers)?)
}

/// Verifies a proof and additionally checks that the asset's commitment
/// matches `commitment`.
pub fn verify_proof_with_commitment<O, H, C>(
    ops: &O,
    config: &ProofConfig,
    proof: &Proof,
    headers: &H,
    commitment: &C,
) -> crate::Result<VerifiedProof>
where
    O: TaprootOps,
    H: HeaderVerifier + ?Sized,
    C: TaroCommitment + ?Sized,
{
    let verified = verify_proof(ops, config, proof, headers)?;
    if verified.commitment_root != commitment.tapscript_root(None) {
        return Err(Error::TaprootProof {
            stage: ProofStage::Inclusion,
            source: taproot_proof::Error::CommitmentRootMismatch,
        }
        .into());
    }
    Ok(verified)
}

/// Decodes and verifies a proof blob.
pub fn verify_proof_blob<O, H>(
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
    let proof = Proof::from_bytes_with_limits(bytes, &config.decode_limits())?;
    Ok(verify_proof_inner(ops, config, &proof, headers)?)
}

pub(crate) fn verify_proof_inner<O, H>(
    ops: &O,
    config: &ProofConfig,
    proof: &Proof,
    headers: &H,
) -> Result<VerifiedProof, Error>
where
    O: TaprootOps,
    H: HeaderVerifier + ?Sized,
{
    if proof.version != config.blob_version {
        return Err(Error::UnsupportedVersion {
            expected: config.blob_version,
            actual: proof.version,
        });
    }

    let inclusion = proof.inclusion_proof().ok_or(Error::MissingInclusionProof)?;
    let count = proof.taproot_proofs.len();
    if count > config.max_taproot_proofs as usize {
        return Err(Error::TooManyTaprootProofs {
            count,
            limit: config.max_taproot_proofs,
        });
    }

    let output_count = proof.tx.output.len();
    if inclusion.output_index as usize >= output_count {
        return Err(Error::OutputIndexInvalid {
            index: inclusion.output_index,
            output_count,
        });
    }

    let exclusions = proof.exclusion_proofs();
    check_exclusion_coverage(inclusion.output_index, output_count, exclusions)?;
    if !exclusions
        .windows(2)
        .all(|pair| pair[0].output_index < pair[1].output_index)
    {
        return Err(Error::UnorderedExclusionProofs);
    }

    let commitment_root = inclusion
        .tapscript_proof
        .commitment_root()
        .ok_or(Error::TaprootProof {
            stage: ProofStage::Inclusion,
            source: taproot_proof::Error::MissingCommitment,
        })?;
    let output_key = verify_taproot_proof(
        ops,
        &proof.tx,
        inclusion,
        commitment_root,
        ProofStage::Inclusion,
    )
    .map_err(Error::at(ProofStage::Inclusion))?;

    for exclusion in exclusions {
        verify_taproot_proof(
            ops,
            &proof.tx,
            exclusion,
            commitment_root,
            ProofStage::Exclusion,
        )
        .map_err(Error::at(ProofStage::Exclusion))?;
    }

    verify_tx_in_block(
        &proof.block_header,
        &proof.tx,
        &proof.merkle_path,
        headers,
        config.max_merkle_depth,
    )?;

    let txid = proof.txid();
    log::debug!(
        "verified proof for {}:{} in block {}",
        txid,
        inclusion.output_index,
        proof.block_header.block_hash()
    );

    Ok(VerifiedProof {
        txid,
        block_hash: proof.block_header.block_hash(),
        output_index: inclusion.output_index,
        output_key,
        commitment_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble_base_proof;
    use crate::testutil::{node, pubkey, Scenario};
    use crate::ErrorKind;
    use alloc::vec;
    use bitcoin::block::Header;

    fn accept_all(_: &Header) -> bool {
        true
    }

    #[test]
    fn coverage_requires_every_other_output_once() {
        let p = |idx| TaprootProof::bip86(idx, pubkey(2));
        check_exclusion_coverage(1, 3, &[p(0), p(2)]).unwrap();
        check_exclusion_coverage(0, 1, &[]).unwrap();
        assert_eq!(
            check_exclusion_coverage(1, 3, &[p(0)]),
            Err(Error::MissingExclusionProof { output_index: 2 })
        );
        assert_eq!(
            check_exclusion_coverage(1, 3, &[p(0), p(0), p(2)]),
            Err(Error::DuplicateExclusionProof { output_index: 0 })
        );
        assert_eq!(
            check_exclusion_coverage(1, 3, &[p(0), p(1), p(2)]),
            Err(Error::UnexpectedExclusionProof { output_index: 1 })
        );
        assert_eq!(
            check_exclusion_coverage(1, 3, &[p(0), p(2), p(3)]),
            Err(Error::UnexpectedExclusionProof { output_index: 3 })
        );
    }

    #[test]
    fn assembled_proof_verifies() {
        let scenario = Scenario::new(1, 3, 2);
        let config = ProofConfig::default();
        let proof = assemble_base_proof(&scenario.ops, &config, &scenario.params()).unwrap();

        let verified =
            verify_proof(&scenario.ops, &config, &proof, &scenario.known_headers()).unwrap();
        assert_eq!(verified.txid, scenario.tx.compute_txid());
        assert_eq!(verified.block_hash, scenario.block.block_hash());
        assert_eq!(verified.output_index, 1);
        assert_eq!(verified.commitment_root, scenario.commitment.0);

        let bytes = proof.to_bytes().unwrap();
        assert_eq!(
            verify_proof_blob(&scenario.ops, &config, &bytes, &accept_all).unwrap(),
            verified
        );
    }

    #[test]
    fn commitment_check_is_optional_but_binding() {
        let scenario = Scenario::new(0, 2, 0);
        let config = ProofConfig::default();
        let proof = assemble_base_proof(&scenario.ops, &config, &scenario.params()).unwrap();

        verify_proof_with_commitment(
            &scenario.ops,
            &config,
            &proof,
            &accept_all,
            &scenario.commitment,
        )
        .unwrap();

        let other = taro_proof_types::commitment::CommitmentRoot(node(b"other"));
        let err = verify_proof_with_commitment(&scenario.ops, &config, &proof, &accept_all, &other)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProofMismatch);
    }

    #[test]
    fn dropped_exclusion_is_incomplete() {
        let scenario = Scenario::new(0, 3, 0);
        let config = ProofConfig::default();
        let mut proof = assemble_base_proof(&scenario.ops, &config, &scenario.params()).unwrap();
        proof.taproot_proofs.pop();

        let err = verify_proof(&scenario.ops, &config, &proof, &accept_all).unwrap_err();
        assert_eq!(
            err,
            crate::Error::Proof(Error::MissingExclusionProof { output_index: 2 })
        );
        assert_eq!(err.kind(), ErrorKind::IncompleteExclusionSet);
    }

    #[test]
    fn swapped_exclusions_are_malformed() {
        let scenario = Scenario::new(0, 3, 0);
        let config = ProofConfig::default();
        let mut proof = assemble_base_proof(&scenario.ops, &config, &scenario.params()).unwrap();
        proof.taproot_proofs.swap(1, 2);

        let err = verify_proof(&scenario.ops, &config, &proof, &accept_all).unwrap_err();
        assert_eq!(err, crate::Error::Proof(Error::UnorderedExclusionProofs));
    }

    #[test]
    fn forged_exclusion_key_is_a_mismatch() {
        let scenario = Scenario::new(0, 2, 0);
        let config = ProofConfig::default();
        let mut proof = assemble_base_proof(&scenario.ops, &config, &scenario.params()).unwrap();
        proof.taproot_proofs[1] = TaprootProof::bip86(1, pubkey(99));

        let err = verify_proof(&scenario.ops, &config, &proof, &accept_all).unwrap_err();
        assert_eq!(
            err,
            crate::Error::Proof(Error::TaprootProof {
                stage: ProofStage::Exclusion,
                source: taproot_proof::Error::InvalidTaprootProof,
            })
        );
        assert_eq!(err.kind(), ErrorKind::ProofMismatch);
    }

    #[test]
    fn unknown_header_and_wrong_version_fail() {
        let scenario = Scenario::new(0, 1, 1);
        let config = ProofConfig::default();
        let mut proof = assemble_base_proof(&scenario.ops, &config, &scenario.params()).unwrap();

        let err = verify_proof(&scenario.ops, &config, &proof, &|_: &Header| false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeaderMismatch);

        proof.version = 3;
        let err = verify_proof(&scenario.ops, &config, &proof, &accept_all).unwrap_err();
        assert_eq!(
            err,
            crate::Error::Proof(Error::UnsupportedVersion {
                expected: 0,
                actual: 3
            })
        );
    }

    #[test]
    fn empty_proof_list_is_malformed() {
        let scenario = Scenario::new(0, 1, 0);
        let config = ProofConfig::default();
        let mut proof = assemble_base_proof(&scenario.ops, &config, &scenario.params()).unwrap();
        proof.taproot_proofs = vec![];

        let err = verify_proof(&scenario.ops, &config, &proof, &accept_all).unwrap_err();
        assert_eq!(err, crate::Error::Proof(Error::MissingInclusionProof));
        assert_eq!(err.kind(), ErrorKind::MalformedProof);
    }
}
