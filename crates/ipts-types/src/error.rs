use thiserror::Error;

use crate::codec::Codec;

/// Errors produced by identifier and codec-tag operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid content identifier: {0}")]
    InvalidCid(String),

    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    #[error("unsupported CID version: expected {expected}, got {actual}")]
    UnsupportedVersion { expected: u64, actual: u64 },

    #[error("codec mismatch: expected {expected}, got 0x{actual:x}")]
    CodecMismatch { expected: Codec, actual: u64 },

    #[error("unsupported hash function: expected 0x{expected:x}, got 0x{actual:x}")]
    UnsupportedHash { expected: u64, actual: u64 },

    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
