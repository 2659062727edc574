//! Put a readable document, read it back in binary form, and pull a float
//! vector out of it.
//!
//! Each step takes the store explicitly and fails fast: the first error ends
//! the flow and is returned unchanged.

use std::path::Path;

use ipts_node::{dagcbor, dagjson, vector, Node, NodeKind};
use ipts_store::DagStore;
use ipts_types::{Codec, ContentId, LinkPrefix};
use tracing::{debug, info};

use crate::error::SdkResult;

/// Field path to a schema's float payload.
pub const VALUES_PATH: [&str; 2] = ["fields", "values"];

/// What [`run_pipeline`] observed at each stage.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    pub id: ContentId,
    pub kind: NodeKind,
    pub len: usize,
    pub floats: Vec<f32>,
}

/// Decode a DAG-JSON file and put it, stored as DAG-CBOR.
///
/// The file is decoded locally first so malformed input never reaches the
/// store. The returned id is checked against the expected
/// CIDv1 / dag-cbor / sha3-384 prefix.
pub fn put_readable_file<S>(store: &S, path: &Path) -> SdkResult<ContentId>
where
    S: DagStore + ?Sized,
{
    let node = dagjson::decode_file(path)?;
    debug!(path = %path.display(), kind = %node.kind(), len = node.len(), "decoded readable file");
    let canonical = dagjson::encode(&node)?;
    let id = store.put(&canonical, Codec::DagJson, Codec::DagCbor)?;
    LinkPrefix::DAG_CBOR.check(&id)?;
    info!(id = %id, path = %path.display(), "put");
    Ok(id)
}

/// Fetch the raw block for `id` and decode it as DAG-CBOR.
pub fn fetch_node<S>(store: &S, id: &ContentId) -> SdkResult<Node>
where
    S: DagStore + ?Sized,
{
    let bytes = store.block_get(id)?;
    let node = dagcbor::decode_slice(&bytes)?;
    debug!(id = %id, bytes = bytes.len(), kind = %node.kind(), len = node.len(), "fetched");
    Ok(node)
}

/// Follow `path` through nested maps, one literal key per segment.
pub fn descend<'n>(node: &'n Node, path: &[&str]) -> SdkResult<&'n Node> {
    path.iter()
        .try_fold(node, |current, key| current.lookup_by_key(key))
        .map_err(Into::into)
}

/// Descend to `path` and decode the bytes found there as little-endian
/// `f32`s. With `strict` unset, a trailing partial value is dropped.
pub fn float_vector_at(node: &Node, path: &[&str], strict: bool) -> SdkResult<Vec<f32>> {
    let bytes = descend(node, path)?.as_bytes()?;
    if strict {
        Ok(vector::f32_from_le_bytes(bytes)?)
    } else {
        Ok(vector::f32_from_le_bytes_truncated(bytes))
    }
}

/// Run the whole flow on one file: put, fetch, descend to
/// `fields/values`, decode floats.
pub fn run_pipeline<S>(store: &S, path: &Path, strict: bool) -> SdkResult<PipelineReport>
where
    S: DagStore + ?Sized,
{
    let id = put_readable_file(store, path)?;
    let node = fetch_node(store, &id)?;
    let floats = float_vector_at(&node, &VALUES_PATH, strict)?;
    info!(id = %id, floats = floats.len(), "pipeline complete");
    Ok(PipelineReport {
        id,
        kind: node.kind(),
        len: node.len(),
        floats,
    })
}
