use ipts_types::SHA3_384;
use multihash::Multihash;
use sha3::{Digest, Sha3_384};

/// SHA3-384 content hasher.
///
/// Digests are taken over the exact bytes handed in; callers are responsible
/// for passing the canonical encoding of a block.
pub struct ContentHasher;

impl ContentHasher {
    /// Raw 48-byte SHA3-384 digest.
    pub fn digest(data: &[u8]) -> [u8; 48] {
        let sum = Sha3_384::digest(data);
        let mut out = [0u8; 48];
        out.copy_from_slice(&sum);
        out
    }

    /// Digest wrapped as a multihash (code 0x15).
    pub fn hash(data: &[u8]) -> Multihash<64> {
        let digest = Self::digest(data);
        Multihash::<64>::wrap(SHA3_384, &digest).expect("SHA3-384 digest fits in Multihash<64>")
    }

    /// Verify that `data` hashes to `expected`.
    pub fn verify(data: &[u8], expected: &Multihash<64>) -> bool {
        expected.code() == SHA3_384 && expected.digest() == Self::digest(data).as_slice()
    }

    /// Hex-encoded digest, for logs and filesystem-style layouts.
    pub fn digest_hex(data: &[u8]) -> String {
        hex::encode(Self::digest(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(ContentHasher::hash(data), ContentHasher::hash(data));
    }

    #[test]
    fn different_data_different_hash() {
        assert_ne!(ContentHasher::hash(b"aaa"), ContentHasher::hash(b"bbb"));
    }

    #[test]
    fn multihash_has_sha3_384_prefix() {
        let mh = ContentHasher::hash(b"x");
        assert_eq!(mh.code(), 0x15);
        assert_eq!(mh.size(), 48);
        assert_eq!(mh.digest().len(), 48);
    }

    #[test]
    fn known_empty_digest() {
        // SHA3-384("")
        assert_eq!(
            ContentHasher::digest_hex(b""),
            "0c63a75b845e4f7d01107d852e4c2485c51a50aaaa94fc61995e71bbee983a2ac3713831264adb47fb6bd1e058d5f004"
        );
    }

    #[test]
    fn verify_correct_and_tampered() {
        let mh = ContentHasher::hash(b"original");
        assert!(ContentHasher::verify(b"original", &mh));
        assert!(!ContentHasher::verify(b"tampered", &mh));
    }
}
