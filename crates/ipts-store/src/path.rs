use std::fmt;
use std::str::FromStr;

use ipts_types::ContentId;

use crate::error::StoreError;

/// A root identifier followed by zero or more literal segments.
///
/// Accepted string forms: `<cid>`, `<cid>/a/b`, `/ipfs/<cid>/a/b`.
/// Segments are map keys, or list indices when the node at that point is a
/// list. There are no wildcards or expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DagPath {
    root: ContentId,
    segments: Vec<String>,
}

impl DagPath {
    pub fn new(root: ContentId) -> Self {
        Self {
            root,
            segments: Vec::new(),
        }
    }

    /// Append one segment.
    pub fn join(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn root(&self) -> &ContentId {
        &self.root
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for DagPath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rest = trimmed
            .strip_prefix("/ipfs/")
            .or_else(|| trimmed.strip_prefix("/ipld/"))
            .unwrap_or(trimmed);
        let mut parts = rest.split('/').filter(|p| !p.is_empty());
        let root = parts.next().ok_or_else(|| StoreError::InvalidPath {
            path: s.to_string(),
            reason: "missing root identifier".into(),
        })?;
        let root = root.parse::<ContentId>().map_err(|e| StoreError::InvalidPath {
            path: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            root,
            segments: parts.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for DagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for seg in &self.segments {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}
