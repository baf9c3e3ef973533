//! Error type shared by every engine operation.

use taro_proof_types::error::Error as DecodeError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::merkle;
use crate::verify::{mint, proof, taproot_proof, tx};
use crate::OpsError;

/// Result type for engine operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by proof assembly and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Curve operation failed.
    #[error(transparent)]
    Ops(#[from] OpsError),
    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Merkle tree construction failed.
    #[error(transparent)]
    Merkle(#[from] merkle::Error),
    /// A taproot proof failed outside of a proof stage.
    #[error(transparent)]
    TaprootProof(#[from] taproot_proof::Error),
    /// Anchor transaction or block binding failed.
    #[error(transparent)]
    Tx(#[from] tx::Error),
    /// Proof structure or verification failed.
    #[error(transparent)]
    Proof(#[from] proof::Error),
    /// Minting blob genesis binding failed.
    #[error(transparent)]
    Mint(#[from] mint::Error),
    /// Blob bytes could not be decoded.
    #[error("malformed blob: {0}")]
    Decode(#[from] DecodeError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A key is not a valid curve point.
    InvalidKey,
    /// Bytes or structure do not form a valid proof.
    MalformedProof,
    /// A revealed preimage does not match the committed output.
    ProofMismatch,
    /// Exclusion proofs do not cover exactly the non-asset outputs.
    IncompleteExclusionSet,
    /// The anchor transaction is not in the claimed block.
    TxNotInBlock,
    /// The header does not commit to the transaction or is not known.
    HeaderMismatch,
    /// The anchor transaction does not spend the genesis outpoint.
    GenesisPointMismatch,
}

impl core::fmt::Display for ErrorKind {
    /// Formats the kind for display.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ErrorKind::InvalidKey => "invalid key",
            ErrorKind::MalformedProof => "malformed proof",
            ErrorKind::ProofMismatch => "proof mismatch",
            ErrorKind::IncompleteExclusionSet => "incomplete exclusion set",
            ErrorKind::TxNotInBlock => "tx not in block",
            ErrorKind::HeaderMismatch => "header mismatch",
            ErrorKind::GenesisPointMismatch => "genesis point mismatch",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Ops(_) => ErrorKind::InvalidKey,
            Error::Config(_) | Error::Decode(_) => ErrorKind::MalformedProof,
            Error::Merkle(_) => ErrorKind::TxNotInBlock,
            Error::TaprootProof(err) => taproot_proof_kind(err),
            Error::Tx(err) => tx_kind(err),
            Error::Proof(err) => proof_kind(err),
            Error::Mint(_) => ErrorKind::GenesisPointMismatch,
        }
    }
}

fn taproot_proof_kind(err: &taproot_proof::Error) -> ErrorKind {
    use taproot_proof::Error as E;
    match err {
        E::InvalidTaprootOutputIndex { .. } | E::MissingCommitment => ErrorKind::MalformedProof,
        E::InvalidTaprootWitnessProgram
        | E::InvalidTaprootOutputKey
        | E::CommitmentRootMismatch
        | E::ExclusionCommitsToAsset
        | E::InvalidTaprootProof => ErrorKind::ProofMismatch,
        E::Ops(_) => ErrorKind::InvalidKey,
    }
}

fn tx_kind(err: &tx::Error) -> ErrorKind {
    use tx::Error as E;
    match err {
        E::TxNotInBlock { .. } | E::TxIndexMismatch { .. } | E::Merkle(_) => {
            ErrorKind::TxNotInBlock
        }
        E::MerklePathTooLong { .. } => ErrorKind::MalformedProof,
        E::InvalidMerklePath | E::MerkleRootMismatch | E::InvalidBlockHeader => {
            ErrorKind::HeaderMismatch
        }
    }
}

fn proof_kind(err: &proof::Error) -> ErrorKind {
    use proof::Error as E;
    match err {
        E::UnsupportedVersion { .. }
        | E::MissingInclusionProof
        | E::OutputIndexInvalid { .. }
        | E::TooManyTaprootProofs { .. }
        | E::UnorderedExclusionProofs => ErrorKind::MalformedProof,
        E::MissingExclusionProof { .. }
        | E::DuplicateExclusionProof { .. }
        | E::UnexpectedExclusionProof { .. } => ErrorKind::IncompleteExclusionSet,
        E::TaprootProof { source, .. } => taproot_proof_kind(source),
        E::Tx(err) => tx_kind(err),
    }
}
