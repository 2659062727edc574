use std::collections::HashMap;
use std::sync::RwLock;

use ipts_crypto::LinkBuilder;
use ipts_types::{Codec, ContentId};
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::traits::DagStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock` and
/// cloned on read/write. IDs are computed locally with the configured
/// [`LinkBuilder`], so what this store returns is exactly what the identifier
/// scheme produces.
pub struct InMemoryDagStore {
    links: LinkBuilder,
    blocks: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl InMemoryDagStore {
    /// Create an empty store using the dag-cbor / sha3-384 link builder.
    pub fn new() -> Self {
        Self::with_links(LinkBuilder::DAG_CBOR)
    }

    /// Create an empty store with a specific link builder.
    pub fn with_links(links: LinkBuilder) -> Self {
        Self {
            links,
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Remove a block. Returns `true` if it existed.
    pub fn remove(&self, id: &ContentId) -> bool {
        self.blocks.write().expect("lock poisoned").remove(id).is_some()
    }

    /// Sorted list of all block IDs.
    pub fn all_ids(&self) -> Vec<ContentId> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut ids: Vec<ContentId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryDagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DagStore for InMemoryDagStore {
    fn put(&self, data: &[u8], input: Codec, store: Codec) -> StoreResult<ContentId> {
        let node = ipts_node::decode(input, data)?;
        let canonical = ipts_node::encode(store, &node)?;
        self.block_put(&canonical, store)
    }

    fn block_put(&self, data: &[u8], codec: Codec) -> StoreResult<ContentId> {
        let id = self.links.for_codec(codec).build(data);
        let mut map = self.blocks.write().expect("lock poisoned");
        // Same ID always maps to the same bytes.
        map.entry(id).or_insert_with(|| data.to_vec());
        trace!(id = %id, len = data.len(), "stored block");
        Ok(id)
    }

    fn block_get(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let map = self.blocks.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }
}

impl std::fmt::Debug for InMemoryDagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDagStore")
            .field("block_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipts_node::{dagcbor, Node, NodeError, NodeKind};
    use ipts_types::LinkPrefix;

    const SCHEMA: &[u8] = br#"{"fields": {"temp": {"type": "f32"}, "_timestamp": {"type": "u64"}}}"#;

    // -----------------------------------------------------------------------
    // put / block_get
    // -----------------------------------------------------------------------

    #[test]
    fn put_json_stores_canonical_cbor() {
        let store = InMemoryDagStore::new();
        let id = store.put(SCHEMA, Codec::DagJson, Codec::DagCbor).unwrap();
        assert!(LinkPrefix::DAG_CBOR.check(&id).is_ok());

        let bytes = store.block_get(&id).unwrap();
        let node = dagcbor::decode_slice(&bytes).unwrap();
        assert_eq!(node.kind(), NodeKind::Map);
        assert_eq!(node.lookup_by_key("fields").unwrap().len(), 2);
    }

    #[test]
    fn id_matches_link_builder() {
        let store = InMemoryDagStore::new();
        let id = store.put(SCHEMA, Codec::DagJson, Codec::DagCbor).unwrap();
        let bytes = store.block_get(&id).unwrap();
        assert!(LinkBuilder::DAG_CBOR.verify(&id, &bytes));
    }

    #[test]
    fn same_content_same_id() {
        let store = InMemoryDagStore::new();
        let a = store.put(br#"{"a": 1, "b": 2}"#, Codec::DagJson, Codec::DagCbor).unwrap();
        let b = store.put(br#"{"b": 2,  "a": 1}"#, Codec::DagJson, Codec::DagCbor).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_different_ids() {
        let store = InMemoryDagStore::new();
        let a = store.put(br#"{"a": 1}"#, Codec::DagJson, Codec::DagCbor).unwrap();
        let b = store.put(br#"{"a": 2}"#, Codec::DagJson, Codec::DagCbor).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn malformed_input_stores_nothing() {
        let store = InMemoryDagStore::new();
        let err = store.put(b"{not json", Codec::DagJson, Codec::DagCbor).unwrap_err();
        assert!(matches!(err, StoreError::Node(NodeError::Decode { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_block_is_not_found() {
        let store = InMemoryDagStore::new();
        let id = LinkBuilder::DAG_CBOR.build(b"never written");
        assert!(matches!(store.block_get(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn raw_blocks_are_tagged_raw() {
        let store = InMemoryDagStore::new();
        let id = store.block_put(&[1, 2, 3, 4], Codec::Raw).unwrap();
        assert_eq!(id.codec(), Some(Codec::Raw));
        assert_eq!(store.get_node(&id).unwrap(), Node::Bytes(vec![1, 2, 3, 4]));
    }

    // -----------------------------------------------------------------------
    // get with paths
    // -----------------------------------------------------------------------

    #[test]
    fn get_descends_fields() {
        let store = InMemoryDagStore::new();
        let id = store.put(SCHEMA, Codec::DagJson, Codec::DagCbor).unwrap();
        let ty = store.get(&format!("{id}/fields/temp/type")).unwrap();
        assert_eq!(ty.as_str().unwrap(), "f32");
    }

    #[test]
    fn get_indexes_lists() {
        let store = InMemoryDagStore::new();
        let id = store
            .put(br#"{"xs": [10, 20, 30]}"#, Codec::DagJson, Codec::DagCbor)
            .unwrap();
        assert_eq!(store.get(&format!("{id}/xs/2")).unwrap(), Node::Int(30));
        assert!(matches!(
            store.get(&format!("{id}/xs/two")),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn get_follows_links() {
        let store = InMemoryDagStore::new();
        let child = store
            .put(br#"{"values": {"/": {"bytes": "AACAPw"}}}"#, Codec::DagJson, Codec::DagCbor)
            .unwrap();
        let parent_json = format!(r#"{{"fields": {{"/": "{child}"}}}}"#);
        let parent = store
            .put(parent_json.as_bytes(), Codec::DagJson, Codec::DagCbor)
            .unwrap();

        let values = store.get(&format!("/ipfs/{parent}/fields/values")).unwrap();
        assert_eq!(values.to_f32_vec().unwrap(), vec![1.0]);

        let whole_child = store.get(&format!("{parent}/fields")).unwrap();
        assert_eq!(whole_child.kind(), NodeKind::Map);
    }

    #[test]
    fn get_missing_key_and_wrong_kind() {
        let store = InMemoryDagStore::new();
        let id = store.put(SCHEMA, Codec::DagJson, Codec::DagCbor).unwrap();
        assert!(matches!(
            store.get(&format!("{id}/nope")),
            Err(StoreError::Node(NodeError::NotFound(_)))
        ));
        assert!(matches!(
            store.get(&format!("{id}/fields/temp/type/deeper")),
            Err(StoreError::Node(NodeError::TypeMismatch { .. }))
        ));
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn remove_and_counts() {
        let store = InMemoryDagStore::default();
        let id = store.block_put(b"12345", Codec::Raw).unwrap();
        store.block_put(b"123456789", Codec::Raw).unwrap();
        assert_eq!(store.total_bytes(), 14);
        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn all_ids_is_sorted() {
        let store = InMemoryDagStore::new();
        for data in [&b"a"[..], b"b", b"c"] {
            store.block_put(data, Codec::Raw).unwrap();
        }
        let ids = store.all_ids();
        assert_eq!(ids.len(), 3);
        for w in ids.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryDagStore::new());
        let id = store.put(SCHEMA, Codec::DagJson, Codec::DagCbor).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let node = store.get_node(&id).unwrap();
                    assert_eq!(node.len(), 1);
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryDagStore::new();
        store.block_put(b"x", Codec::Raw).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryDagStore"));
        assert!(debug.contains("block_count"));
    }
}
