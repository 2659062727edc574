use ipts_node::NodeError;
use ipts_types::{ContentId, TypeError};

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(ContentId),

    /// A `get` path could not be parsed.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The block's codec has no node decoder.
    #[error("unsupported codec 0x{0:x}")]
    UnsupportedCodec(u64),

    /// Content hash mismatch on read (data corruption or a lying node).
    #[error("hash mismatch for {0}")]
    HashMismatch(ContentId),

    /// Decoding, encoding or traversing a node failed.
    #[error("node error: {0}")]
    Node(#[from] NodeError),

    /// An identifier was malformed or had an unexpected prefix.
    #[error("identifier error: {0}")]
    Type(#[from] TypeError),

    /// The HTTP request itself failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node API answered with an error status.
    #[error("node API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The node API answered with a body we could not interpret.
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
