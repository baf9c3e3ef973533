use crate::alloc::string::String; // For no_std compatibility
use thiserror::Error;

/// Errors raised while decoding a proof or minting blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unexpected end of blob reading {field}: needed {needed} bytes, {remaining} left")]
    UnexpectedEof {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("unsupported blob version {actual}, expected {expected}")]
    UnsupportedVersion { expected: u8, actual: u8 },

    #[error("unknown taproot proof kind {0}")]
    UnknownProofKind(u8),

    #[error("blob of {actual} bytes exceeds limit of {limit}")]
    BlobTooLarge { actual: usize, limit: usize },

    #[error("{field} count {count} exceeds limit of {limit}")]
    TooManyEntries {
        field: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("{0} trailing bytes after blob")]
    TrailingBytes(usize),

    #[error("{field} value {value} does not fit the wire encoding")]
    ValueOutOfRange { field: &'static str, value: u64 },

    #[error("Bitcoin serialization error: {0}")]
    BitcoinSerialization(String),
}
