//! High-level convenience API for Taro proofs.
//!
//! Re-exports the low-level crates and wires them to a bitcoin/secp256k1
//! backend.

/// Re-export of taro-proof-core for backend implementations.
pub use taro_proof_core as core;
/// Re-export of taro-proof-types for the blob records.
pub use taro_proof_types as types;

/// JSON configuration loading.
pub mod config;
mod ops;
/// Host-side proof construction helpers.
pub mod proof;
/// Host-side verification helpers, including batch verification.
pub mod verify;

pub use ops::BitcoinTaprootOps;
pub use proof::{assemble_base_proof, derive_output_key, new_minting_blobs};
pub use taro_proof_core::config::ProofConfig;
pub use taro_proof_core::{Error, ErrorKind, Result};
pub use verify::{verify_minting_blob, verify_minting_blobs_batch, verify_proof_blob};
