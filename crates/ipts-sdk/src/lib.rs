//! High-level SDK for iptsdb.
//!
//! The free functions in [`pipeline`] are the core flow: decode a readable
//! file, put it, fetch the stored binary block back, descend into it by
//! field name and decode the float vector found there. [`Ipts`] bundles a
//! store with an [`IptsConfig`] for applications that want one handle.

pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;

pub use client::Ipts;
pub use config::IptsConfig;
pub use error::{SdkError, SdkResult};
pub use pipeline::{
    descend, fetch_node, float_vector_at, put_readable_file, run_pipeline, PipelineReport,
    VALUES_PATH,
};

// Re-export key types
pub use ipts_node::{Node, NodeKind};
pub use ipts_store::{DagStore, InMemoryDagStore, KuboClient, KuboConfig};
pub use ipts_table::{Cell, Selection, Table};
pub use ipts_types::{Codec, ContentId, LinkPrefix};
