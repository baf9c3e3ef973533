//! Taproot output key derivation.

use alloc::vec::Vec;
use bitcoin::hashes::Hash;
use bitcoin::taproot::TapNodeHash;
use bitcoin::ScriptBuf;
use taro_proof_types::key::SerializedKey;

use crate::{OpsError, TaprootOps};

/// Witness v1 program prefix: OP_1 followed by a 32-byte push.
const P2TR_PREFIX: [u8; 2] = [0x51, 0x20];

/// Derives the x-only output key for `internal_key` tweaked with
/// `tapscript_root`, or with no root at all for a BIP-86 output.
///
/// The root must already be the fully combined tapscript root.
pub fn derive_output_key<O: TaprootOps>(
    ops: &O,
    internal_key: &SerializedKey,
    tapscript_root: Option<TapNodeHash>,
) -> Result<[u8; 32], OpsError> {
    let internal = ops.parse_internal_key(internal_key)?;
    let output_key =
        ops.taproot_output_key(&internal, tapscript_root.map(|root| root.to_byte_array()))?;
    xonly_from_serialized_key(&output_key)
}

/// Builds the P2TR script pubkey paying to an x-only output key.
pub fn taproot_script_pubkey(output_key: [u8; 32]) -> ScriptBuf {
    let mut script = Vec::with_capacity(34);
    script.extend_from_slice(&P2TR_PREFIX);
    script.extend_from_slice(&output_key);
    ScriptBuf::from_bytes(script)
}

/// Extracts an x-only key from a serialized compressed public key.
fn xonly_from_serialized_key(key: &SerializedKey) -> Result<[u8; 32], OpsError> {
    match key.bytes[0] {
        0x02 | 0x03 => Ok(key.x_only_bytes()),
        _ => Err(OpsError::InvalidTaprootOutputKey),
    }
}
