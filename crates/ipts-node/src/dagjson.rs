//! DAG-JSON: the human-readable tree format.
//!
//! Plain JSON plus two reserved single-key objects:
//!
//! - `{"/": "<cid>"}` is a link
//! - `{"/": {"bytes": "<base64>"}}` is a byte string (standard alphabet,
//!   unpadded on output, padding optional on input)

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use ipts_types::{Codec, ContentId};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use tracing::debug;

use crate::builder::MapBuilder;
use crate::error::{NodeError, NodeResult};
use crate::node::Node;

const FORMAT: &str = "dag-json";
const LINK_KEY: &str = "/";
const BYTES_KEY: &str = "bytes";

const BYTES_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a DAG-JSON stream. The whole stream is consumed; trailing
/// non-whitespace is an error.
pub fn decode<R: Read>(reader: R) -> NodeResult<Node> {
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    let node = NodeSeed.deserialize(&mut deserializer).map_err(from_json_error)?;
    deserializer.end().map_err(from_json_error)?;
    Ok(node)
}

/// Decode a DAG-JSON byte slice.
pub fn decode_slice(bytes: &[u8]) -> NodeResult<Node> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let node = NodeSeed.deserialize(&mut deserializer).map_err(from_json_error)?;
    deserializer.end().map_err(from_json_error)?;
    Ok(node)
}

/// Open `path` and decode it as DAG-JSON.
///
/// A file that cannot be opened is reported as [`NodeError::Io`] carrying the
/// path and the underlying cause.
pub fn decode_file(path: impl AsRef<Path>) -> NodeResult<Node> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| NodeError::Io {
        context: format!("opening {}", path.display()),
        source,
    })?;
    let node = decode(BufReader::new(file))?;
    debug!(path = %path.display(), kind = %node.kind(), len = node.len(), "decoded dag-json file");
    Ok(node)
}

/// Encode a node as DAG-JSON. Map keys come out sorted.
pub fn encode(node: &Node) -> NodeResult<Vec<u8>> {
    let value = to_value(node)?;
    serde_json::to_vec(&value).map_err(|e| NodeError::Encode {
        format: FORMAT,
        reason: e.to_string(),
    })
}

/// Encode a node as indented DAG-JSON, for display.
pub fn encode_pretty(node: &Node) -> NodeResult<String> {
    let value = to_value(node)?;
    serde_json::to_string_pretty(&value).map_err(|e| NodeError::Encode {
        format: FORMAT,
        reason: e.to_string(),
    })
}

/// Convert an already parsed JSON value into a node.
///
/// `serde_json::Value` has already merged repeated keys; decode from bytes
/// to have them rejected.
pub fn from_value(value: Value) -> NodeResult<Node> {
    NodeSeed.deserialize(value).map_err(from_json_error)
}

/// Deserializes one DAG-JSON value straight into a [`Node`], keeping map
/// entries in source order.
struct NodeSeed;

impl<'de> DeserializeSeed<'de> for NodeSeed {
    type Value = Node;

    fn deserialize<D>(self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a DAG-JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        i64::try_from(v)
            .map(Node::Int)
            .map_err(|_| E::custom(format!("integer {v} out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(NodeSeed)? {
            items.push(item);
        }
        Ok(Node::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut builder = MapBuilder::with_capacity(map.size_hint().unwrap_or(0));
        let Some(first) = map.next_key::<String>()? else {
            return Ok(builder.build());
        };
        let first_value = map.next_value_seed(NodeSeed)?;
        let mut next = map.next_key::<String>()?;
        if first == LINK_KEY && next.is_none() {
            return from_reserved(first_value).map_err(de::Error::custom);
        }
        builder.insert(first, first_value).map_err(de::Error::custom)?;
        while let Some(key) = next {
            let value = map.next_value_seed(NodeSeed)?;
            builder.insert(key, value).map_err(de::Error::custom)?;
            next = map.next_key()?;
        }
        Ok(builder.build())
    }
}

/// Interpret the value under a lone `"/"` key.
fn from_reserved(value: Node) -> Result<Node, String> {
    const MALFORMED: &str = "malformed reserved \"/\" object";
    match value {
        Node::String(s) => s.parse::<ContentId>().map(Node::Link).map_err(|e| e.to_string()),
        Node::Map(inner) if inner.len() == 1 => match inner.get(BYTES_KEY) {
            Some(Node::String(encoded)) => BYTES_DECODER
                .decode(encoded.as_bytes())
                .map(Node::Bytes)
                .map_err(|e| format!("invalid base64 bytes: {e}")),
            _ => Err(MALFORMED.to_string()),
        },
        _ => Err(MALFORMED.to_string()),
    }
}

fn to_value(node: &Node) -> NodeResult<Value> {
    Ok(match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(*b),
        Node::Int(i) => Value::from(*i),
        Node::Float(f) => {
            let n = serde_json::Number::from_f64(*f).ok_or_else(|| NodeError::Encode {
                format: FORMAT,
                reason: format!("non-finite float {f}"),
            })?;
            Value::Number(n)
        }
        Node::String(s) => Value::String(s.clone()),
        Node::Bytes(b) => reserved(Value::Object(Map::from_iter([(
            BYTES_KEY.to_string(),
            Value::String(STANDARD_NO_PAD.encode(b)),
        )]))),
        Node::List(items) => Value::Array(items.iter().map(to_value).collect::<NodeResult<_>>()?),
        Node::Map(map) => {
            let mut out = Map::new();
            for (k, v) in map.iter() {
                out.insert(k.to_string(), to_value(v)?);
            }
            Value::Object(out)
        }
        Node::Link(id) => reserved(Value::String(id.to_string())),
    })
}

fn reserved(inner: Value) -> Value {
    Value::Object(Map::from_iter([(LINK_KEY.to_string(), inner)]))
}

fn from_json_error(err: serde_json::Error) -> NodeError {
    if err.is_io() {
        NodeError::Io {
            context: format!("reading {}", Codec::DagJson),
            source: err.into(),
        }
    } else {
        NodeError::decode(FORMAT, err.to_string())
    }
}
