//! Column-oriented time-series tables for iptsdb.
//!
//! A table lives entirely in the block store. Its root node links to two
//! children:
//!
//! ```text
//! root   {"schema": <link>, "head": <link>}
//! schema {"fields": {"temp": {"type": "f32"}, "_timestamp": {"type": "u64"}}}
//! head   {"temp": {"type": "f32", "values": <bytes>}, "_timestamp": {...}}
//! ```
//!
//! Each column's `values` is a packed little-endian array of its type, so
//! row `n` is the `n`th fixed-width cell of every column. Inserting a record
//! writes a new head and a new root; old blocks stay valid, and callers carry
//! whichever root id they want to read.
//!
//! # Key Types
//!
//! - [`ColumnType`]: fixed-width cell types, `u8` through `f64`
//! - [`Schema`]: the field list, always including `_timestamp`
//! - [`HeadRecord`]: the packed columns, with `append` and `rows`
//! - [`Table`]: `create` / `insert` / `select` over a [`DagStore`](ipts_store::DagStore)

pub mod column;
pub mod error;
pub mod head;
pub mod schema;
pub mod table;

pub use column::{Cell, ColumnType};
pub use error::{TableError, TableResult};
pub use head::{Column, HeadRecord};
pub use schema::{Field, Schema, TIMESTAMP_FIELD};
pub use table::{Selection, Table, TableRoot};
