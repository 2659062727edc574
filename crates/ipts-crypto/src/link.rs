use ipts_types::{Codec, ContentId, LinkPrefix, TypeError};

use crate::hasher::ContentHasher;

/// Reusable template that turns canonical block bytes into a [`ContentId`].
///
/// The builder is fixed at construction time; [`LinkBuilder::build`] is a
/// pure function of the bytes it is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkBuilder {
    prefix: LinkPrefix,
}

impl LinkBuilder {
    /// CIDv1 / dag-cbor / sha3-384.
    pub const DAG_CBOR: Self = Self {
        prefix: LinkPrefix::DAG_CBOR,
    };

    /// Builder for an already validated prefix.
    pub const fn new(prefix: LinkPrefix) -> Self {
        Self { prefix }
    }

    /// Validate the raw parameters and build a builder.
    pub fn from_parts(
        version: u64,
        codec: Codec,
        hash_code: u64,
        hash_len: usize,
    ) -> Result<Self, TypeError> {
        LinkPrefix::new(version, codec, hash_code, hash_len).map(Self::new)
    }

    /// Same version and hash, different content codec.
    pub const fn for_codec(self, codec: Codec) -> Self {
        Self {
            prefix: self.prefix.with_codec(codec),
        }
    }

    pub fn prefix(&self) -> &LinkPrefix {
        &self.prefix
    }

    /// Compute the identifier for `encoded`, the canonical encoding of a block.
    pub fn build(&self, encoded: &[u8]) -> ContentId {
        ContentId::new(self.prefix.codec(), ContentHasher::hash(encoded))
    }

    /// Check that `id` carries this builder's prefix and that `bytes` hash to it.
    pub fn verify(&self, id: &ContentId, bytes: &[u8]) -> bool {
        self.prefix.matches(id) && id.digest() == ContentHasher::digest(bytes).as_slice()
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::DAG_CBOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic() {
        let id1 = LinkBuilder::DAG_CBOR.build(b"\xa1\x61a\x01");
        let id2 = LinkBuilder::DAG_CBOR.build(b"\xa1\x61a\x01");
        assert_eq!(id1, id2);
        assert_eq!(id1.to_string(), id2.to_string());
    }

    #[test]
    fn different_bytes_different_ids() {
        let id1 = LinkBuilder::DAG_CBOR.build(b"\x01");
        let id2 = LinkBuilder::DAG_CBOR.build(b"\x02");
        assert_ne!(id1, id2);
    }

    #[test]
    fn built_ids_carry_the_prefix() {
        let id = LinkBuilder::default().build(b"block");
        assert_eq!(id.version(), 1);
        assert_eq!(id.codec_code(), 0x71);
        assert_eq!(id.hash_code(), 0x15);
        assert_eq!(id.digest().len(), 48);
        assert!(LinkPrefix::DAG_CBOR.check(&id).is_ok());
    }

    #[test]
    fn from_parts_rejects_unsupported_config() {
        assert!(LinkBuilder::from_parts(1, Codec::DagCbor, 0x15, 48).is_ok());
        assert!(LinkBuilder::from_parts(0, Codec::DagCbor, 0x15, 48).is_err());
        assert!(LinkBuilder::from_parts(1, Codec::DagCbor, 0x12, 32).is_err());
    }

    #[test]
    fn codec_is_part_of_identity() {
        let data = b"same bytes";
        let cbor = LinkBuilder::DAG_CBOR.build(data);
        let raw = LinkBuilder::DAG_CBOR.for_codec(Codec::Raw).build(data);
        assert_ne!(cbor, raw);
        assert_eq!(cbor.digest(), raw.digest());
    }

    #[test]
    fn verify_checks_prefix_and_digest() {
        let builder = LinkBuilder::DAG_CBOR;
        let id = builder.build(b"content");
        assert!(builder.verify(&id, b"content"));
        assert!(!builder.verify(&id, b"other"));
        assert!(!builder.for_codec(Codec::Raw).verify(&id, b"content"));
    }
}
