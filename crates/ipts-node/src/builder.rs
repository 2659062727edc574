//! Builders that assemble nodes and then freeze them.

use crate::error::{NodeError, NodeResult};
use crate::node::{Node, NodeMap};

/// Accumulates map entries; rejects duplicate keys.
#[derive(Debug, Default)]
pub struct MapBuilder {
    entries: Vec<(String, Node)>,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Add an entry. Fails if `key` is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> NodeResult<()> {
        let key = key.into();
        if self.entries.iter().any(|(k, _)| *k == key) {
            return Err(NodeError::DuplicateKey(key));
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn entry(mut self, key: impl Into<String>, value: Node) -> NodeResult<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze into a map node.
    pub fn build(self) -> Node {
        Node::Map(NodeMap::from_unique_entries(self.entries))
    }
}

/// Accumulates list elements.
#[derive(Debug, Default)]
pub struct ListBuilder {
    items: Vec<Node>,
}

impl ListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(mut self, item: Node) -> Self {
        self.items.push(item);
        self
    }

    pub fn append(&mut self, item: Node) {
        self.items.push(item);
    }

    /// Freeze into a list node.
    pub fn build(self) -> Node {
        Node::List(self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_rejected() {
        let mut b = MapBuilder::new();
        b.insert("k", Node::Null).unwrap();
        let err = b.insert("k", Node::Int(1)).unwrap_err();
        assert!(matches!(err, NodeError::DuplicateKey(ref k) if k == "k"));
        // The first value survives.
        assert_eq!(b.build().lookup_by_key("k").unwrap(), &Node::Null);
    }

    #[test]
    fn chained_entries() {
        let node = MapBuilder::new()
            .entry("type", Node::from("f32"))
            .and_then(|b| b.entry("values", Node::Bytes(vec![])))
            .unwrap()
            .build();
        assert_eq!(node.len(), 2);
    }

    #[test]
    fn map_keeps_insertion_order() {
        let node = MapBuilder::new()
            .entry("z", Node::Null)
            .and_then(|b| b.entry("a", Node::Null))
            .unwrap()
            .build();
        let keys: Vec<&str> = node.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn list_builder() {
        let mut b = ListBuilder::with_capacity(2);
        b.append(Node::Int(1));
        let node = b.push(Node::Int(2)).build();
        assert_eq!(node, Node::List(vec![Node::Int(1), Node::Int(2)]));
    }

    #[test]
    fn empty_builders() {
        assert!(MapBuilder::new().is_empty());
        assert!(MapBuilder::new().build().is_empty());
        assert!(ListBuilder::new().build().is_empty());
    }
}
