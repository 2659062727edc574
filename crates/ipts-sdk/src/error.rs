use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("node error: {0}")]
    Node(#[from] ipts_node::NodeError),

    #[error("store error: {0}")]
    Store(#[from] ipts_store::StoreError),

    #[error("table error: {0}")]
    Table(#[from] ipts_table::TableError),

    #[error("identifier error: {0}")]
    Type(#[from] ipts_types::TypeError),
}

pub type SdkResult<T> = Result<T, SdkError>;
