use std::fmt;
use std::str::FromStr;

use cid::{Cid, Version};
use multihash::Multihash;

use crate::codec::Codec;
use crate::error::TypeError;

/// Content identifier: a CIDv1 over a multihash digest.
///
/// The canonical string form is base32-lower multibase (`bafy...`), which is
/// what the store API accepts and returns. Two blocks with identical bytes
/// under the same prefix always produce the same `ContentId`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(Cid);

impl ContentId {
    /// Build a CIDv1 from a codec and an already-computed multihash.
    pub fn new(codec: Codec, hash: Multihash<64>) -> Self {
        Self(Cid::new_v1(codec.code(), hash))
    }

    /// Build a CIDv1 by wrapping a raw digest with the given hash code.
    pub fn from_digest(codec: Codec, hash_code: u64, digest: &[u8]) -> Result<Self, TypeError> {
        let mh = Multihash::<64>::wrap(hash_code, digest)
            .map_err(|e| TypeError::InvalidCid(e.to_string()))?;
        Ok(Self::new(codec, mh))
    }

    /// Wrap an existing `Cid`.
    pub fn from_cid(cid: Cid) -> Self {
        Self(cid)
    }

    /// Borrow the inner `Cid`.
    pub fn as_cid(&self) -> &Cid {
        &self.0
    }

    /// CID version number (0 or 1).
    pub fn version(&self) -> u64 {
        match self.0.version() {
            Version::V0 => 0,
            Version::V1 => 1,
        }
    }

    /// The raw multicodec value.
    pub fn codec_code(&self) -> u64 {
        self.0.codec()
    }

    /// The codec, if it is one iptsdb knows.
    pub fn codec(&self) -> Option<Codec> {
        Codec::from_code(self.0.codec())
    }

    /// The multihash function code.
    pub fn hash_code(&self) -> u64 {
        self.0.hash().code()
    }

    /// The digest bytes (without the multihash code/length prefix).
    pub fn digest(&self) -> &[u8] {
        self.0.hash().digest()
    }

    /// Hex-encoded digest.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }

    /// Short form for logs: the last 8 characters of the string form.
    pub fn short(&self) -> String {
        let s = self.0.to_string();
        let start = s.len().saturating_sub(8);
        s[start..].to_string()
    }

    /// Standard CID binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    /// Parse from CID binary bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        Cid::try_from(bytes)
            .map(Self)
            .map_err(|e| TypeError::InvalidCid(e.to_string()))
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

impl FromStr for ContentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cid::try_from(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidCid(format!("{s}: {e}")))
    }
}

impl PartialOrd for ContentId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContentId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl serde::Serialize for ContentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> serde::Deserialize<'de> for ContentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            ContentId::from_str(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            ContentId::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
