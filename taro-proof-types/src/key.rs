//! Compressed public key bytes carried inside proofs.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length in bytes of a compressed secp256k1 public key.
pub const SERIALIZED_KEY_LEN: usize = 33;

/// A compressed public key as it appears on the wire.
///
/// The bytes are not validated as a curve point when decoded; validation
/// happens when a backend parses the key for tweaking.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SerializedKey {
    pub bytes: [u8; SERIALIZED_KEY_LEN],
}

impl SerializedKey {
    /// Wraps raw compressed key bytes.
    pub const fn new(bytes: [u8; SERIALIZED_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Returns the key with its parity byte stripped.
    pub fn x_only_bytes(&self) -> [u8; 32] {
        let mut xonly = [0u8; 32];
        xonly.copy_from_slice(&self.bytes[1..]);
        xonly
    }
}

impl From<bitcoin::secp256k1::PublicKey> for SerializedKey {
    fn from(key: bitcoin::secp256k1::PublicKey) -> Self {
        Self::new(key.serialize())
    }
}

impl fmt::Debug for SerializedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerializedKey(")?;
        for byte in self.bytes {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl Serialize for SerializedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.bytes)
    }
}

impl<'de> Deserialize<'de> for SerializedKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        let bytes: [u8; SERIALIZED_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            serde::de::Error::invalid_length(bytes.len(), &"33 compressed key bytes")
        })?;
        Ok(Self { bytes })
    }
}
