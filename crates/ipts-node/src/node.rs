//! The generic node model.
//!
//! [`Node`] is a closed tagged union over the kinds a DAG block can hold.
//! Maps keep their entries in decode order with unique keys; see
//! [`NodeMap`]. Accessors fail with [`NodeError::TypeMismatch`] instead of
//! coercing between kinds.

use std::fmt;

use ipts_types::ContentId;

use crate::error::{NodeError, NodeResult};

/// Kind tag of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    List,
    Map,
    Link,
}

impl NodeKind {
    /// Scalars have no children and a length of zero.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Bytes | Self::List | Self::Map)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "map"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// An immutable, self-describing tree value.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Node>),
    Map(NodeMap),
    /// Reference to another block.
    Link(ContentId),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Null => NodeKind::Null,
            Self::Bool(_) => NodeKind::Bool,
            Self::Int(_) => NodeKind::Int,
            Self::Float(_) => NodeKind::Float,
            Self::String(_) => NodeKind::String,
            Self::Bytes(_) => NodeKind::Bytes,
            Self::List(_) => NodeKind::List,
            Self::Map(_) => NodeKind::Map,
            Self::Link(_) => NodeKind::Link,
        }
    }

    /// Number of children for maps and lists, byte count for bytes, zero for
    /// everything else.
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(b) => b.len(),
            Self::List(items) => items.len(),
            Self::Map(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single-level, case-sensitive lookup of `key` in a map.
    pub fn lookup_by_key(&self, key: &str) -> NodeResult<&Node> {
        self.as_map_for("lookup_by_key")?
            .get(key)
            .ok_or_else(|| NodeError::NotFound(key.to_string()))
    }

    /// Element `index` of a list.
    pub fn lookup_by_index(&self, index: usize) -> NodeResult<&Node> {
        let items = self.as_list_for("lookup_by_index")?;
        items.get(index).ok_or(NodeError::IndexOutOfRange {
            index,
            len: items.len(),
        })
    }

    pub fn as_map(&self) -> NodeResult<&NodeMap> {
        self.as_map_for("as_map")
    }

    pub fn as_list(&self) -> NodeResult<&[Node]> {
        self.as_list_for("as_list")
    }

    pub fn as_bytes(&self) -> NodeResult<&[u8]> {
        match self {
            Self::Bytes(b) => Ok(b),
            other => Err(NodeError::mismatch("as_bytes", NodeKind::Bytes, other.kind())),
        }
    }

    pub fn as_str(&self) -> NodeResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(NodeError::mismatch("as_str", NodeKind::String, other.kind())),
        }
    }

    pub fn as_int(&self) -> NodeResult<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(NodeError::mismatch("as_int", NodeKind::Int, other.kind())),
        }
    }

    pub fn as_float(&self) -> NodeResult<f64> {
        match self {
            Self::Float(v) => Ok(*v),
            other => Err(NodeError::mismatch("as_float", NodeKind::Float, other.kind())),
        }
    }

    pub fn as_bool(&self) -> NodeResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(NodeError::mismatch("as_bool", NodeKind::Bool, other.kind())),
        }
    }

    pub fn as_link(&self) -> NodeResult<&ContentId> {
        match self {
            Self::Link(id) => Ok(id),
            other => Err(NodeError::mismatch("as_link", NodeKind::Link, other.kind())),
        }
    }

    /// Numeric value as `f64`, accepting both ints and floats.
    pub fn as_number(&self) -> NodeResult<f64> {
        match self {
            Self::Int(i) => Ok(*i as f64),
            Self::Float(v) => Ok(*v),
            other => Err(NodeError::mismatch("as_number", NodeKind::Float, other.kind())),
        }
    }

    fn as_map_for(&self, operation: &'static str) -> NodeResult<&NodeMap> {
        match self {
            Self::Map(map) => Ok(map),
            other => Err(NodeError::mismatch(operation, NodeKind::Map, other.kind())),
        }
    }

    fn as_list_for(&self, operation: &'static str) -> NodeResult<&[Node]> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(NodeError::mismatch(operation, NodeKind::List, other.kind())),
        }
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ContentId> for Node {
    fn from(v: ContentId) -> Self {
        Self::Link(v)
    }
}

/// Map entries with unique string keys, in insertion order.
///
/// Only [`MapBuilder`](crate::MapBuilder) creates these, which is where key
/// uniqueness is enforced. Equality ignores entry order.
#[derive(Clone, Debug, Default)]
pub struct NodeMap {
    entries: Vec<(String, Node)>,
}

impl NodeMap {
    pub(crate) fn from_unique_entries(entries: Vec<(String, Node)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for NodeMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ListBuilder, MapBuilder};

    fn sample_map() -> Node {
        let mut b = MapBuilder::new();
        b.insert("a", Node::Int(1)).unwrap();
        b.insert(
            "b",
            ListBuilder::new()
                .push(Node::Bool(true))
                .push(Node::Bool(false))
                .build(),
        )
        .unwrap();
        b.build()
    }

    #[test]
    fn lookup_present_key_returns_stored_value() {
        let node = sample_map();
        assert_eq!(node.lookup_by_key("a").unwrap(), &Node::Int(1));
        let b = node.lookup_by_key("b").unwrap();
        assert_eq!(b.kind(), NodeKind::List);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn lookup_missing_key_is_not_found() {
        let err = sample_map().lookup_by_key("c").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(sample_map().lookup_by_key("A").unwrap_err().is_not_found());
    }

    #[test]
    fn lookup_on_non_map_is_type_mismatch() {
        for node in [
            Node::Int(3),
            Node::Bytes(vec![1]),
            Node::List(vec![]),
            Node::Null,
        ] {
            let err = node.lookup_by_key("a").unwrap_err();
            match err {
                NodeError::TypeMismatch {
                    expected, actual, ..
                } => {
                    assert_eq!(expected, NodeKind::Map);
                    assert_eq!(actual, node.kind());
                }
                other => panic!("expected TypeMismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn type_mismatch_message_says_not_a_map() {
        let err = Node::Int(3).lookup_by_key("a").unwrap_err();
        assert_eq!(err.to_string(), "lookup_by_key: not a map (found int)");
    }

    #[test]
    fn lookup_by_index() {
        let list = Node::List(vec![Node::from("x"), Node::from("y")]);
        assert_eq!(list.lookup_by_index(1).unwrap(), &Node::from("y"));
        assert!(matches!(
            list.lookup_by_index(2),
            Err(NodeError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            Node::Null.lookup_by_index(0),
            Err(NodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn length_invariant() {
        assert_eq!(sample_map().len(), 2);
        assert_eq!(Node::Bytes(vec![0; 7]).len(), 7);
        assert_eq!(Node::List(vec![Node::Null; 3]).len(), 3);
        assert_eq!(Node::Int(42).len(), 0);
        assert_eq!(Node::from("hello").len(), 0);
        assert!(Node::Null.is_empty());
    }

    #[test]
    fn accessors_check_kind() {
        assert_eq!(Node::Bytes(vec![9]).as_bytes().unwrap(), &[9]);
        assert!(Node::from("s").as_bytes().is_err());
        assert_eq!(Node::from("s").as_str().unwrap(), "s");
        assert_eq!(Node::Int(5).as_int().unwrap(), 5);
        assert!(Node::Int(5).as_float().is_err());
        assert_eq!(Node::Int(5).as_number().unwrap(), 5.0);
        assert!(Node::Bool(true).as_bool().unwrap());
        assert!(Node::Null.as_link().is_err());
    }

    #[test]
    fn map_equality_ignores_order() {
        let mut a = MapBuilder::new();
        a.insert("x", Node::Int(1)).unwrap();
        a.insert("y", Node::Int(2)).unwrap();
        let mut b = MapBuilder::new();
        b.insert("y", Node::Int(2)).unwrap();
        b.insert("x", Node::Int(1)).unwrap();
        assert_eq!(a.build(), b.build());
    }

    #[test]
    fn scalar_kinds() {
        assert!(NodeKind::Link.is_scalar());
        assert!(NodeKind::String.is_scalar());
        assert!(!NodeKind::Bytes.is_scalar());
        assert!(!NodeKind::Map.is_scalar());
    }
}
