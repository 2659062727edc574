//! Foundation types for iptsdb.
//!
//! Every block iptsdb writes is addressed by a CIDv1 whose prefix is fixed
//! by a [`LinkPrefix`]: version 1, a content codec from [`Codec`], and a
//! SHA3-384 multihash. Other crates depend on `ipts-types` for these
//! identifiers and never re-derive them from raw strings themselves.
//!
//! # Key Types
//!
//! - [`ContentId`]: CIDv1 wrapper, base32 string form
//! - [`Codec`]: multicodec tags understood by the node codecs and stores
//! - [`LinkPrefix`]: the identifier-construction policy (version, codec, hash)

pub mod codec;
pub mod content_id;
pub mod error;
pub mod prefix;

pub use codec::Codec;
pub use content_id::ContentId;
pub use error::TypeError;
pub use prefix::{LinkPrefix, CID_VERSION, SHA3_384, SHA3_384_LEN};
