//! Hashing and link building for iptsdb.
//!
//! [`ContentHasher`] computes SHA3-384 digests wrapped as multihashes;
//! [`LinkBuilder`] combines a [`LinkPrefix`](ipts_types::LinkPrefix) with a
//! hasher to turn canonical block bytes into a
//! [`ContentId`](ipts_types::ContentId).
//!
//! Digests come from the RustCrypto `sha3` crate.

pub mod hasher;
pub mod link;

pub use hasher::ContentHasher;
pub use link::LinkBuilder;
