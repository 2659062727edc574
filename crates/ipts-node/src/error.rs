//! Error types for node decoding, encoding and traversal.

use crate::node::NodeKind;

/// Errors that can occur while building, decoding or reading nodes.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The input is not well-formed for the named format, is truncated,
    /// or holds a value no node kind can represent.
    #[error("{format} decode error: {reason}")]
    Decode {
        /// Format name (`dag-json`, `dag-cbor`, `f32le`, ...).
        format: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// A node could not be written in the named format.
    #[error("{format} encode error: {reason}")]
    Encode {
        /// Format name.
        format: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// The underlying reader or file failed.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// What was being done when the error happened.
        context: String,
        /// The underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// An operation was attempted on a node of the wrong kind.
    #[error("{operation}: not a {expected} (found {actual})")]
    TypeMismatch {
        /// The operation that was attempted.
        operation: &'static str,
        /// The kind the operation needs.
        expected: NodeKind,
        /// The kind the node actually has.
        actual: NodeKind,
    },

    /// A map lookup found no entry for the key.
    #[error("key not found: {0:?}")]
    NotFound(String),

    /// A list lookup ran past the end.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// List length.
        len: usize,
    },

    /// A map builder was given the same key twice.
    #[error("duplicate map key: {0:?}")]
    DuplicateKey(String),
}

impl NodeError {
    pub(crate) fn decode(format: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            format,
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(operation: &'static str, expected: NodeKind, actual: NodeKind) -> Self {
        Self::TypeMismatch {
            operation,
            expected,
            actual,
        }
    }

    /// `true` for a missing map key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience alias for node results.
pub type NodeResult<T> = Result<T, NodeError>;
