use crate::codec::Codec;
use crate::content_id::ContentId;
use crate::error::TypeError;

/// The only CID version iptsdb writes.
pub const CID_VERSION: u64 = 1;
/// SHA3-384 multihash code.
pub const SHA3_384: u64 = 0x15;
/// SHA3-384 digest length in bytes.
pub const SHA3_384_LEN: usize = 48;

/// Identifier-construction policy: CID version, content codec, hash function
/// and digest length.
///
/// A prefix is not an identifier. Combined with the canonical encoding of a
/// block it determines one. Only version 1 with SHA3-384 is supported;
/// [`LinkPrefix::new`] rejects anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkPrefix {
    version: u64,
    codec: Codec,
    hash_code: u64,
    hash_len: usize,
}

impl LinkPrefix {
    /// CIDv1, dag-cbor (0x71), sha3-384 (0x15), 48-byte digest.
    pub const DAG_CBOR: Self = Self {
        version: CID_VERSION,
        codec: Codec::DagCbor,
        hash_code: SHA3_384,
        hash_len: SHA3_384_LEN,
    };

    /// Validate and build a prefix.
    pub fn new(
        version: u64,
        codec: Codec,
        hash_code: u64,
        hash_len: usize,
    ) -> Result<Self, TypeError> {
        if version != CID_VERSION {
            return Err(TypeError::UnsupportedVersion {
                expected: CID_VERSION,
                actual: version,
            });
        }
        if hash_code != SHA3_384 {
            return Err(TypeError::UnsupportedHash {
                expected: SHA3_384,
                actual: hash_code,
            });
        }
        if hash_len != SHA3_384_LEN {
            return Err(TypeError::InvalidLength {
                expected: SHA3_384_LEN,
                actual: hash_len,
            });
        }
        Ok(Self {
            version,
            codec,
            hash_code,
            hash_len,
        })
    }

    /// Same version and hash, different content codec.
    pub const fn with_codec(self, codec: Codec) -> Self {
        Self { codec, ..self }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn hash_code(&self) -> u64 {
        self.hash_code
    }

    pub fn hash_len(&self) -> usize {
        self.hash_len
    }

    /// Reject identifiers that were not built under this prefix.
    ///
    /// Stores may hand back identifiers with whatever prefix they were
    /// configured with; callers check them here before trusting them.
    pub fn check(&self, id: &ContentId) -> Result<(), TypeError> {
        if id.version() != self.version {
            return Err(TypeError::UnsupportedVersion {
                expected: self.version,
                actual: id.version(),
            });
        }
        if id.codec_code() != self.codec.code() {
            return Err(TypeError::CodecMismatch {
                expected: self.codec,
                actual: id.codec_code(),
            });
        }
        if id.hash_code() != self.hash_code {
            return Err(TypeError::UnsupportedHash {
                expected: self.hash_code,
                actual: id.hash_code(),
            });
        }
        if id.digest().len() != self.hash_len {
            return Err(TypeError::InvalidLength {
                expected: self.hash_len,
                actual: id.digest().len(),
            });
        }
        Ok(())
    }

    /// `true` if [`check`](Self::check) would pass.
    pub fn matches(&self, id: &ContentId) -> bool {
        self.check(id).is_ok()
    }
}

impl Default for LinkPrefix {
    fn default() -> Self {
        Self::DAG_CBOR
    }
}
