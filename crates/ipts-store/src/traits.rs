use ipts_node::{Node, NodeKind};
use ipts_types::{Codec, ContentId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::path::DagPath;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written; writing the same bytes twice is a
///   no-op that returns the same ID.
/// - Reads never interpret data beyond what the block's codec says.
/// - All I/O and transport errors are propagated, never retried or ignored.
pub trait DagStore: Send + Sync {
    /// Decode `data` with `input`, store its canonical `store` encoding and
    /// return the resulting ID.
    fn put(&self, data: &[u8], input: Codec, store: Codec) -> StoreResult<ContentId>;

    /// Store `data` verbatim, tagged with `codec`.
    fn block_put(&self, data: &[u8], codec: Codec) -> StoreResult<ContentId>;

    /// Fetch the raw stored bytes of a block.
    ///
    /// Returns [`StoreError::NotFound`] if the block does not exist.
    fn block_get(&self, id: &ContentId) -> StoreResult<Vec<u8>>;

    /// Fetch a block and decode it according to its codec.
    fn get_node(&self, id: &ContentId) -> StoreResult<Node> {
        let codec = id
            .codec()
            .ok_or(StoreError::UnsupportedCodec(id.codec_code()))?;
        let bytes = self.block_get(id)?;
        let node = ipts_node::decode(codec, bytes.as_slice())?;
        debug!(id = %id, kind = %node.kind(), len = node.len(), "decoded block");
        Ok(node)
    }

    /// Encode a node canonically with `codec` and store it.
    fn put_node(&self, node: &Node, codec: Codec) -> StoreResult<ContentId> {
        let bytes = ipts_node::encode(codec, node)?;
        self.block_put(&bytes, codec)
    }

    /// Resolve `<cid>[/segment...]` to a node.
    ///
    /// Each segment is a literal map key (or a list index when the current
    /// node is a list). Links met along the way, including at the end, are
    /// followed into their blocks.
    fn get(&self, path: &str) -> StoreResult<Node> {
        let path: DagPath = path.parse()?;
        self.resolve(&path)
    }

    /// [`get`](Self::get) for an already parsed path.
    fn resolve(&self, path: &DagPath) -> StoreResult<Node> {
        let mut current = self.get_node(path.root())?;
        for segment in path.segments() {
            if let Node::Link(id) = current {
                current = self.get_node(&id)?;
            }
            current = match current.kind() {
                NodeKind::List => match segment.parse::<usize>() {
                    Ok(index) => current.lookup_by_index(index)?.clone(),
                    Err(_) => {
                        return Err(StoreError::InvalidPath {
                            path: path.to_string(),
                            reason: format!("segment {segment:?} is not a list index"),
                        })
                    }
                },
                _ => current.lookup_by_key(segment)?.clone(),
            };
        }
        if let Node::Link(id) = current {
            current = self.get_node(&id)?;
        }
        Ok(current)
    }
}
