//! Verification routines for proofs and minting blobs.

/// Minting blob verification helpers.
pub mod mint;
/// Proof verification helpers.
pub mod proof;
/// Taproot proof verification helpers.
pub mod taproot_proof;
/// Anchor transaction verification helpers.
pub mod tx;

pub use proof::VerifiedProof;
pub use tx::HeaderVerifier;
