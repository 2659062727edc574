//! Generic DAG nodes for iptsdb.
//!
//! A [`Node`] is an immutable, kind-tagged tree value produced by decoding
//! either of the two supported block formats:
//!
//! - [`dagjson`]: the human-readable tree format (DAG-JSON)
//! - [`dagcbor`]: the compact binary tree format (DAG-CBOR), which is also
//!   the canonical encoding content identifiers are computed over
//!
//! Nodes are assembled through [`MapBuilder`] / [`ListBuilder`] and are
//! frozen once built. Lookups are single-level: descending `fields` then
//! `values` is two calls to [`Node::lookup_by_key`].
//!
//! [`vector`] turns a byte-valued node into `f32` values.

pub mod builder;
pub mod dagcbor;
pub mod dagjson;
pub mod error;
pub mod node;
pub mod vector;

pub use builder::{ListBuilder, MapBuilder};
pub use error::{NodeError, NodeResult};
pub use node::{Node, NodeKind, NodeMap};

use std::io::Read;

use ipts_types::Codec;

/// Decode a block of the given codec into a node.
///
/// `Raw` blocks become a single `Bytes` node.
pub fn decode<R: Read>(codec: Codec, mut reader: R) -> NodeResult<Node> {
    match codec {
        Codec::DagCbor => dagcbor::decode(reader),
        Codec::DagJson => dagjson::decode(reader),
        Codec::Raw => {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).map_err(|source| NodeError::Io {
                context: "reading raw block".into(),
                source,
            })?;
            Ok(Node::Bytes(buf))
        }
    }
}

/// Encode a node with the given codec.
///
/// Only `Bytes` nodes can be encoded as `Raw`.
pub fn encode(codec: Codec, node: &Node) -> NodeResult<Vec<u8>> {
    match codec {
        Codec::DagCbor => dagcbor::encode(node),
        Codec::DagJson => dagjson::encode(node),
        Codec::Raw => node
            .as_bytes()
            .map(<[u8]>::to_vec)
            .map_err(|_| NodeError::Encode {
                format: codec.name(),
                reason: format!("raw blocks hold bytes, not {}", node.kind()),
            }),
    }
}
