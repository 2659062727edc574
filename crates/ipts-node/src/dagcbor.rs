//! DAG-CBOR: the compact binary tree format.
//!
//! Decoding accepts any well-formed layout (definite or indefinite length
//! containers, any float width) and rejects what a node cannot hold:
//! non-string map keys, tags other than 42, integers outside `i64`, and
//! trailing bytes after the top-level item.
//!
//! Encoding is canonical: shortest-form heads, definite lengths, map keys
//! ordered by length and then bytewise, every float as an 8-byte double,
//! links as tag 42 over `0x00 || cid`. NaN and the infinities cannot be
//! encoded. Identical nodes always encode to identical bytes, which is what
//! content identifiers hash.

use std::io::{ErrorKind, Read};

use ciborium::value::Value;
use ipts_types::ContentId;
use tracing::trace;

use crate::builder::MapBuilder;
use crate::error::{NodeError, NodeResult};
use crate::node::Node;

const FORMAT: &str = "dag-cbor";
/// CBOR tag for CIDs.
pub const CID_TAG: u64 = 42;
/// Multibase identity prefix carried inside tag 42.
const CID_MULTIBASE_IDENTITY: u8 = 0x00;

// Major types.
const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

const SIMPLE_FALSE: u8 = 0xf4;
const SIMPLE_TRUE: u8 = 0xf5;
const SIMPLE_NULL: u8 = 0xf6;
const FLOAT64: u8 = 0xfb;

/// Decode one DAG-CBOR item from `reader`. The reader must hold nothing else.
pub fn decode<R: Read>(mut reader: R) -> NodeResult<Node> {
    let value: Value = ciborium::de::from_reader(&mut reader).map_err(from_cbor_error)?;
    let mut rest = [0u8; 1];
    match reader.read(&mut rest) {
        Ok(0) => {}
        Ok(_) => return Err(NodeError::decode(FORMAT, "trailing bytes after top-level item")),
        Err(source) => {
            return Err(NodeError::Io {
                context: "reading dag-cbor".into(),
                source,
            })
        }
    }
    from_value(value)
}

/// Decode a DAG-CBOR block held in memory.
pub fn decode_slice(bytes: &[u8]) -> NodeResult<Node> {
    trace!(len = bytes.len(), "decoding dag-cbor block");
    decode(bytes)
}

/// Canonically encode a node.
pub fn encode(node: &Node) -> NodeResult<Vec<u8>> {
    let mut out = Vec::new();
    write_node(node, &mut out)?;
    Ok(out)
}

fn from_value(value: Value) -> NodeResult<Node> {
    match value {
        Value::Null => Ok(Node::Null),
        Value::Bool(b) => Ok(Node::Bool(b)),
        Value::Integer(i) => {
            let wide = i128::from(i);
            i64::try_from(wide)
                .map(Node::Int)
                .map_err(|_| NodeError::decode(FORMAT, format!("integer {wide} out of range")))
        }
        Value::Float(f) => Ok(Node::Float(f)),
        Value::Text(s) => Ok(Node::String(s)),
        Value::Bytes(b) => Ok(Node::Bytes(b)),
        Value::Array(items) => items
            .into_iter()
            .map(from_value)
            .collect::<NodeResult<Vec<_>>>()
            .map(Node::List),
        Value::Map(entries) => {
            let mut builder = MapBuilder::with_capacity(entries.len());
            for (key, value) in entries {
                let Value::Text(key) = key else {
                    return Err(NodeError::decode(FORMAT, "map keys must be strings"));
                };
                builder
                    .insert(key, from_value(value)?)
                    .map_err(|e| NodeError::decode(FORMAT, e.to_string()))?;
            }
            Ok(builder.build())
        }
        Value::Tag(CID_TAG, inner) => decode_link(*inner),
        Value::Tag(tag, _) => Err(NodeError::decode(FORMAT, format!("unsupported tag {tag}"))),
        _ => Err(NodeError::decode(FORMAT, "unsupported simple value")),
    }
}

fn decode_link(inner: Value) -> NodeResult<Node> {
    let Value::Bytes(bytes) = inner else {
        return Err(NodeError::decode(FORMAT, "tag 42 must wrap a byte string"));
    };
    match bytes.split_first() {
        Some((&CID_MULTIBASE_IDENTITY, cid)) => ContentId::from_bytes(cid)
            .map(Node::Link)
            .map_err(|e| NodeError::decode(FORMAT, e.to_string())),
        _ => Err(NodeError::decode(FORMAT, "tag 42 missing multibase identity prefix")),
    }
}

fn write_node(node: &Node, out: &mut Vec<u8>) -> NodeResult<()> {
    match node {
        Node::Null => out.push(SIMPLE_NULL),
        Node::Bool(false) => out.push(SIMPLE_FALSE),
        Node::Bool(true) => out.push(SIMPLE_TRUE),
        Node::Int(i) if *i >= 0 => write_head(MAJOR_UNSIGNED, i.unsigned_abs(), out),
        // -1 - i, which is the bitwise complement
        Node::Int(i) => write_head(MAJOR_NEGATIVE, !*i as u64, out),
        Node::Float(f) => {
            if !f.is_finite() {
                return Err(NodeError::Encode {
                    format: FORMAT,
                    reason: format!("non-finite float {f}"),
                });
            }
            out.push(FLOAT64);
            out.extend_from_slice(&f.to_be_bytes());
        }
        Node::String(s) => {
            write_head(MAJOR_TEXT, s.len() as u64, out);
            out.extend_from_slice(s.as_bytes());
        }
        Node::Bytes(b) => {
            write_head(MAJOR_BYTES, b.len() as u64, out);
            out.extend_from_slice(b);
        }
        Node::List(items) => {
            write_head(MAJOR_ARRAY, items.len() as u64, out);
            for item in items {
                write_node(item, out)?;
            }
        }
        Node::Map(map) => {
            let mut entries: Vec<(&str, &Node)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
            write_head(MAJOR_MAP, entries.len() as u64, out);
            for (key, value) in entries {
                write_head(MAJOR_TEXT, key.len() as u64, out);
                out.extend_from_slice(key.as_bytes());
                write_node(value, out)?;
            }
        }
        Node::Link(id) => {
            let cid = id.to_bytes();
            write_head(MAJOR_TAG, CID_TAG, out);
            write_head(MAJOR_BYTES, cid.len() as u64 + 1, out);
            out.push(CID_MULTIBASE_IDENTITY);
            out.extend_from_slice(&cid);
        }
    }
    Ok(())
}

/// Initial byte plus the shortest argument encoding for `arg`.
fn write_head(major: u8, arg: u64, out: &mut Vec<u8>) {
    let major = major << 5;
    if let Ok(small) = u8::try_from(arg) {
        if small < 24 {
            out.push(major | small);
        } else {
            out.extend_from_slice(&[major | 24, small]);
        }
    } else if let Ok(v) = u16::try_from(arg) {
        out.push(major | 25);
        out.extend_from_slice(&v.to_be_bytes());
    } else if let Ok(v) = u32::try_from(arg) {
        out.push(major | 26);
        out.extend_from_slice(&v.to_be_bytes());
    } else {
        out.push(major | 27);
        out.extend_from_slice(&arg.to_be_bytes());
    }
}

fn from_cbor_error(err: ciborium::de::Error<std::io::Error>) -> NodeError {
    match err {
        ciborium::de::Error::Io(e) if e.kind() == ErrorKind::UnexpectedEof => {
            NodeError::decode(FORMAT, "truncated input")
        }
        ciborium::de::Error::Io(source) => NodeError::Io {
            context: "reading dag-cbor".into(),
            source,
        },
        other => NodeError::decode(FORMAT, other.to_string()),
    }
}
