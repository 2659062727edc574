use ipts_node::{MapBuilder, Node};
use ipts_store::DagStore;
use ipts_types::{Codec, ContentId};
use tracing::{debug, info};

use crate::column::Cell;
use crate::error::{TableError, TableResult};
use crate::head::HeadRecord;
use crate::schema::Schema;

const NODE: &str = "table root";

/// The root node of a table: `{"schema": <link>, "head": <link>}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRoot {
    pub schema: ContentId,
    pub head: ContentId,
}

impl TableRoot {
    pub fn from_node(node: &Node) -> TableResult<Self> {
        let link = |key: &str| {
            node.lookup_by_key(key)
                .and_then(Node::as_link)
                .copied()
                .map_err(|e| TableError::InvalidNode {
                    node: NODE,
                    reason: format!("{key}: {e}"),
                })
        };
        Ok(Self {
            schema: link("schema")?,
            head: link("head")?,
        })
    }

    pub fn to_node(&self) -> TableResult<Node> {
        Ok(MapBuilder::with_capacity(2)
            .entry("schema", Node::Link(self.schema))?
            .entry("head", Node::Link(self.head))?
            .build())
    }
}

/// Result of a [`Table::select`].
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Table operations against a store.
///
/// Every write produces new blocks and a new root id; nothing is modified in
/// place, so any earlier root id still reads the table as it was.
pub struct Table<'s, S: DagStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: DagStore + ?Sized> Table<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Store the schema and an empty head; returns the first root id.
    pub fn create(&self, schema_node: &Node) -> TableResult<ContentId> {
        let schema = Schema::from_node(schema_node)?;
        let schema_id = self.store.put_node(&schema.to_node()?, Codec::DagCbor)?;
        info!(schema = %schema_id, fields = schema.len(), "stored schema");
        let head = HeadRecord::empty(&schema);
        self.write_root(schema_id, &head)
    }

    /// Append one record; returns the new root id.
    pub fn insert(&self, root: &ContentId, record: &Node) -> TableResult<ContentId> {
        let (links, schema, mut head) = self.load(root)?;
        debug!(root = %root, rows = head.row_count(), fields = schema.len(), "inserting");
        head.append(record)?;
        self.write_root(links.schema, &head)
    }

    /// Decode rows of `fields` (all fields when empty), at most `limit` rows.
    pub fn select(
        &self,
        root: &ContentId,
        fields: &[&str],
        limit: Option<usize>,
    ) -> TableResult<Selection> {
        let (_, schema, head) = self.load(root)?;
        let columns: Vec<String> = if fields.is_empty() {
            schema.names().map(str::to_string).collect()
        } else {
            fields.iter().map(|f| f.to_string()).collect()
        };
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        let rows = head.rows(&names, limit)?;
        Ok(Selection { columns, rows })
    }

    pub fn schema(&self, root: &ContentId) -> TableResult<Schema> {
        let links = self.root(root)?;
        Schema::from_node(&self.store.get_node(&links.schema)?)
    }

    pub fn head(&self, root: &ContentId) -> TableResult<HeadRecord> {
        let links = self.root(root)?;
        HeadRecord::from_node(&self.store.get_node(&links.head)?)
    }

    pub fn root(&self, root: &ContentId) -> TableResult<TableRoot> {
        TableRoot::from_node(&self.store.get_node(root)?)
    }

    fn load(&self, root: &ContentId) -> TableResult<(TableRoot, Schema, HeadRecord)> {
        let links = self.root(root)?;
        let schema = Schema::from_node(&self.store.get_node(&links.schema)?)?;
        let head = HeadRecord::from_node(&self.store.get_node(&links.head)?)?;
        Ok((links, schema, head))
    }

    fn write_root(&self, schema: ContentId, head: &HeadRecord) -> TableResult<ContentId> {
        let head_id = self.store.put_node(&head.to_node()?, Codec::DagCbor)?;
        let links = TableRoot {
            schema,
            head: head_id,
        };
        let root = self.store.put_node(&links.to_node()?, Codec::DagCbor)?;
        info!(root = %root, head = %head_id, rows = head.row_count(), "stored table root");
        Ok(root)
    }
}
