//! Little-endian primitives for the proof blob wire format.

use alloc::{string::ToString, vec::Vec};
use bitcoin::block::Header;
use bitcoin::consensus::encode::{deserialize, deserialize_partial, serialize};
use bitcoin::Transaction;

use crate::error::Error;

/// Length in bytes of a serialized block header.
pub const HEADER_LEN: usize = 80;

/// Bounds applied while decoding untrusted blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Blob version the decoder accepts.
    pub version: u8,
    /// Maximum number of sibling hashes in a Merkle inclusion path.
    pub max_merkle_depth: u16,
    /// Maximum number of per-output Taproot proofs.
    pub max_taproot_proofs: u16,
    /// Maximum size of a blob in bytes.
    pub max_blob_bytes: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            version: crate::proof::BLOB_VERSION,
            max_merkle_depth: 32,
            max_taproot_proofs: u16::MAX,
            max_blob_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Cursor over a borrowed blob.
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(Error::UnexpectedEof {
                field,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], Error> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(field, N)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, Error> {
        Ok(self.read_array::<1>(field)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, Error> {
        Ok(u16::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_header(&mut self) -> Result<Header, Error> {
        let raw = self.take("block header", HEADER_LEN)?;
        deserialize(raw).map_err(|e| Error::BitcoinSerialization(e.to_string()))
    }

    /// Reads a transaction in its consensus encoding, which carries its own
    /// length.
    pub fn read_tx(&mut self) -> Result<Transaction, Error> {
        let (tx, consumed) = deserialize_partial::<Transaction>(&self.bytes[self.pos..])
            .map_err(|e| Error::BitcoinSerialization(e.to_string()))?;
        self.pos += consumed;
        Ok(tx)
    }

    /// Fails if any bytes are left unread.
    pub fn finish(self) -> Result<(), Error> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(Error::TrailingBytes(n)),
        }
    }
}

pub fn write_u16(out: &mut Vec<u8>, field: &'static str, value: usize) -> Result<(), Error> {
    let value = u16::try_from(value).map_err(|_| Error::ValueOutOfRange {
        field,
        value: value as u64,
    })?;
    out.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_header(out: &mut Vec<u8>, header: &Header) {
    out.extend_from_slice(&serialize(header));
}

pub fn write_tx(out: &mut Vec<u8>, tx: &Transaction) {
    out.extend_from_slice(&serialize(tx));
}

/// Rejects a count that exceeds its configured limit.
pub fn check_count(field: &'static str, count: usize, limit: u16) -> Result<(), Error> {
    if count > limit as usize {
        return Err(Error::TooManyEntries {
            field,
            count,
            limit: limit as usize,
        });
    }
    Ok(())
}
