//! Error types for the table crate.

use ipts_node::NodeError;
use ipts_store::StoreError;

/// Errors that can occur during table operations.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A column type name is not one of `u8..u64`, `i8..i64`, `f32`, `f64`.
    #[error("unknown column type: {0:?}")]
    UnknownType(String),

    /// The schema node does not have the expected shape.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A head record or root node does not have the expected shape.
    #[error("invalid {node} node: {reason}")]
    InvalidNode { node: &'static str, reason: String },

    /// A selected field is not a column of the table.
    #[error("no such field: {0}")]
    UnknownField(String),

    /// A record is missing a value for a schema field.
    #[error("record is missing field: {0}")]
    MissingField(String),

    /// A record value does not fit its column type.
    #[error("invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Node decoding or lookup failed.
    #[error("node error: {0}")]
    Node(#[from] NodeError),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for table results.
pub type TableResult<T> = Result<T, TableError>;
