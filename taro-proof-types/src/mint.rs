//! Genesis (first mint) proof blobs.

use alloc::vec::Vec;
use bitcoin::hashes::Hash;
use bitcoin::{OutPoint, Txid};
use serde::{Deserialize, Serialize};

use crate::codec::{self, DecodeLimits, Reader};
use crate::error::Error;
use crate::proof::Proof;

/// A genesis proof: the base proof bound to the outpoint whose spend
/// authorised the mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintingBlob {
    /// Outpoint consumed by the first input of the minting transaction.
    pub genesis_point: OutPoint,

    /// The assembled proof for the minting transaction.
    pub proof: Proof,
}

impl MintingBlob {
    /// Encodes the blob: genesis txid and vout, then the base proof.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.genesis_point.txid.to_byte_array());
        codec::write_u32(&mut out, self.genesis_point.vout);
        self.proof.encode_into(&mut out)?;
        Ok(out)
    }

    /// Decodes a minting blob with default limits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_bytes_with_limits(bytes, &DecodeLimits::default())
    }

    /// Decodes a minting blob, rejecting anything outside `limits`.
    pub fn from_bytes_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Result<Self, Error> {
        if bytes.len() > limits.max_blob_bytes {
            return Err(Error::BlobTooLarge {
                actual: bytes.len(),
                limit: limits.max_blob_bytes,
            });
        }

        let mut reader = Reader::new(bytes);
        let txid = Txid::from_byte_array(reader.read_array("genesis txid")?);
        let vout = reader.read_u32("genesis vout")?;
        let proof = Proof::decode(&mut reader, limits)?;
        reader.finish()?;

        Ok(MintingBlob {
            genesis_point: OutPoint { txid, vout },
            proof,
        })
    }
}
