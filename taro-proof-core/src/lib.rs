#![no_std]

extern crate alloc;

use taro_proof_types::key::SerializedKey;
use thiserror::Error;

/// Errors returned by TaprootOps implementations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpsError {
    /// Internal key bytes are not a valid curve point.
    #[error("invalid internal key")]
    InvalidInternalKey,
    /// Taproot output key derivation failed.
    #[error("invalid taproot output key")]
    InvalidTaprootOutputKey,
}

/// Trait that supplies the elliptic-curve operations needed by the engine.
pub trait TaprootOps {
    /// Backend-specific public key representation.
    type PubKey;

    /// Parses an internal key into the backend representation.
    fn parse_internal_key(
        &self,
        key: &SerializedKey,
    ) -> core::result::Result<Self::PubKey, OpsError>;

    /// Computes the Taproot output key for an internal key and optional tapscript root.
    fn taproot_output_key(
        &self,
        internal_key: &Self::PubKey,
        tapscript_root: Option<[u8; 32]>,
    ) -> core::result::Result<SerializedKey, OpsError>;
}

impl<O: TaprootOps + ?Sized> TaprootOps for &O {
    type PubKey = O::PubKey;

    fn parse_internal_key(
        &self,
        key: &SerializedKey,
    ) -> core::result::Result<Self::PubKey, OpsError> {
        (**self).parse_internal_key(key)
    }

    fn taproot_output_key(
        &self,
        internal_key: &Self::PubKey,
        tapscript_root: Option<[u8; 32]>,
    ) -> core::result::Result<SerializedKey, OpsError> {
        (**self).taproot_output_key(internal_key, tapscript_root)
    }
}

/// Base proof assembly.
pub mod assemble;
/// Engine configuration.
pub mod config;
mod error;
/// Taproot output key derivation.
pub mod key;
/// Block Merkle tree builder and path verifier.
pub mod merkle;
/// Minting blob construction.
pub mod mint;
/// Verification routines for proofs and minting blobs.
pub mod verify;

pub use error::{Error, ErrorKind, Result};
pub use taro_proof_types as types;

#[cfg(test)]
pub(crate) mod testutil;
