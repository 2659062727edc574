//! Content-addressed block store clients for iptsdb.
//!
//! The store is an external collaborator: iptsdb only talks to it through
//! the [`DagStore`] trait, passed explicitly to every operation that needs
//! it. There is no process-wide client handle.
//!
//! # Backends
//!
//! - [`InMemoryDagStore`]: `HashMap`-based store for tests and embedding
//! - [`KuboClient`]: blocking HTTP client for a Kubo-compatible node API
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written; the same bytes under the same
//!    prefix always produce the same [`ContentId`](ipts_types::ContentId).
//! 2. `put` decodes with the input codec and stores the canonical encoding
//!    of the store codec; `block_put` stores bytes verbatim.
//! 3. The store never retries; failures propagate to the caller.

pub mod error;
pub mod kubo;
pub mod memory;
pub mod path;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use kubo::{KuboClient, KuboConfig};
pub use memory::InMemoryDagStore;
pub use path::DagPath;
pub use traits::DagStore;
