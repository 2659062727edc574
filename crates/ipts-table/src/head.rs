use std::io::{Cursor, ErrorKind};

use chrono::Utc;
use ipts_node::{MapBuilder, Node};
use tracing::{debug, trace};

use crate::column::{Cell, ColumnType};
use crate::error::{TableError, TableResult};
use crate::schema::{Schema, TIMESTAMP_FIELD};

const NODE: &str = "head record";

/// One packed column of a head record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub values: Vec<u8>,
}

impl Column {
    /// Number of complete cells.
    pub fn len(&self) -> usize {
        self.values.len() / self.ty.width()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The current contents of every column, as stored in the head node:
/// `{name: {"type": "<ty>", "values": <bytes>}, ...}`.
///
/// The bytes field is why this node only exists in binary form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadRecord {
    columns: Vec<Column>,
}

impl HeadRecord {
    /// An empty head with one column per schema field.
    pub fn empty(schema: &Schema) -> Self {
        Self {
            columns: schema
                .fields()
                .iter()
                .map(|f| Column {
                    name: f.name.clone(),
                    ty: f.ty,
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn from_node(node: &Node) -> TableResult<Self> {
        let map = node.as_map().map_err(invalid)?;
        let columns = map
            .iter()
            .map(|(name, col)| {
                let ty: ColumnType = col
                    .lookup_by_key("type")
                    .and_then(Node::as_str)
                    .map_err(|e| invalid(format!("column {name:?}: {e}")))?
                    .parse()?;
                let values = col
                    .lookup_by_key("values")
                    .and_then(Node::as_bytes)
                    .map_err(|e| invalid(format!("column {name:?}: {e}")))?;
                if values.len() % ty.width() != 0 {
                    return Err(invalid(format!(
                        "column {name:?}: {} bytes is not a whole number of {ty} cells",
                        values.len()
                    )));
                }
                Ok(Column {
                    name: name.to_string(),
                    ty,
                    values: values.to_vec(),
                })
            })
            .collect::<TableResult<Vec<_>>>()?;
        Ok(Self { columns })
    }

    pub fn to_node(&self) -> TableResult<Node> {
        let mut map = MapBuilder::with_capacity(self.columns.len());
        for col in &self.columns {
            let entry = MapBuilder::new()
                .entry("type", Node::from(col.ty.name()))?
                .entry("values", Node::Bytes(col.values.clone()))?;
            map.insert(col.name.clone(), entry.build())?;
        }
        Ok(map.build())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of complete rows: the length of the shortest column.
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).min().unwrap_or(0)
    }

    /// Append one record, stamped with the current time if it has no
    /// `_timestamp` of its own.
    pub fn append(&mut self, record: &Node) -> TableResult<()> {
        let now = Utc::now().timestamp();
        self.append_at(record, u64::try_from(now).unwrap_or(0))
    }

    /// Append one record, using `now` for a missing `_timestamp`.
    ///
    /// Every column gets exactly one cell or, on error, none does.
    pub fn append_at(&mut self, record: &Node, now: u64) -> TableResult<()> {
        let map = record.as_map()?;
        let mut cells = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let stamp;
            let value = match map.get(&col.name) {
                Some(v) => v,
                None if col.name == TIMESTAMP_FIELD => {
                    stamp = Node::Int(i64::try_from(now).unwrap_or(i64::MAX));
                    &stamp
                }
                None => return Err(TableError::MissingField(col.name.clone())),
            };
            let mut cell = Vec::with_capacity(col.ty.width());
            col.ty.encode_value(&col.name, value, &mut cell)?;
            cells.push(cell);
        }
        for (col, cell) in self.columns.iter_mut().zip(cells) {
            col.values.extend_from_slice(&cell);
        }
        trace!(rows = self.row_count(), "appended record");
        Ok(())
    }

    /// Decode row-aligned cells of `fields` (all columns when empty).
    ///
    /// Stops at the first row where any selected column has run out;
    /// `limit` caps the number of rows returned.
    pub fn rows(&self, fields: &[&str], limit: Option<usize>) -> TableResult<Vec<Vec<Cell>>> {
        let selected: Vec<&Column> = if fields.is_empty() {
            self.columns.iter().collect()
        } else {
            fields
                .iter()
                .map(|f| {
                    self.column(f)
                        .ok_or_else(|| TableError::UnknownField(f.to_string()))
                })
                .collect::<TableResult<_>>()?
        };
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let mut readers: Vec<Cursor<&[u8]>> =
            selected.iter().map(|c| Cursor::new(c.values.as_slice())).collect();
        let mut rows = Vec::new();
        'rows: while limit.map_or(true, |n| rows.len() < n) {
            let mut row = Vec::with_capacity(selected.len());
            for (col, reader) in selected.iter().zip(readers.iter_mut()) {
                match col.ty.read_cell(reader) {
                    Ok(Cell::Unsigned(v)) if col.name == TIMESTAMP_FIELD => {
                        row.push(Cell::Timestamp(v))
                    }
                    Ok(cell) => row.push(cell),
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => break 'rows,
                    Err(e) => return Err(invalid(e.to_string())),
                }
            }
            rows.push(row);
        }
        debug!(columns = selected.len(), rows = rows.len(), "decoded rows");
        Ok(rows)
    }
}

fn invalid(reason: impl ToString) -> TableError {
    TableError::InvalidNode {
        node: NODE,
        reason: reason.to_string(),
    }
}
