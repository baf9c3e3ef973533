//! Engine configuration, passed explicitly to every entry point that needs it.

use serde::{Deserialize, Serialize};
use taro_proof_types::codec::DecodeLimits;
use taro_proof_types::proof::BLOB_VERSION;
use thiserror::Error;

/// Errors returned by [`ProofConfig::validate`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured blob version is not one this build can encode.
    #[error("unsupported blob version {0}")]
    UnsupportedVersion(u8),
    /// A limit was set to zero.
    #[error("{0} must be non-zero")]
    ZeroLimit(&'static str),
}

/// Settings shared by the assembler, the minting builder and the verifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofConfig {
    /// Version byte written into, and required from, proof blobs.
    pub blob_version: u8,
    /// Longest accepted Merkle inclusion path. 32 levels cover any block
    /// the base chain can produce.
    pub max_merkle_depth: u16,
    /// Largest accepted number of per-output Taproot proofs.
    pub max_taproot_proofs: u16,
    /// Largest accepted blob in bytes.
    pub max_blob_bytes: usize,
}

impl Default for ProofConfig {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            blob_version: BLOB_VERSION,
            max_merkle_depth: limits.max_merkle_depth,
            max_taproot_proofs: limits.max_taproot_proofs,
            max_blob_bytes: limits.max_blob_bytes,
        }
    }
}

impl ProofConfig {
    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blob_version != BLOB_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.blob_version));
        }
        if self.max_merkle_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_merkle_depth"));
        }
        if self.max_taproot_proofs == 0 {
            return Err(ConfigError::ZeroLimit("max_taproot_proofs"));
        }
        if self.max_blob_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max_blob_bytes"));
        }
        Ok(())
    }

    /// Returns the limits the blob decoder enforces under this configuration.
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            version: self.blob_version,
            max_merkle_depth: self.max_merkle_depth,
            max_taproot_proofs: self.max_taproot_proofs,
            max_blob_bytes: self.max_blob_bytes,
        }
    }
}
