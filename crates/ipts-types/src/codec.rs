use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Multicodec tag for the compact binary tree format.
pub const DAG_CBOR: u64 = 0x71;
/// Multicodec tag for the readable tree format.
pub const DAG_JSON: u64 = 0x0129;
/// Multicodec tag for uninterpreted bytes.
pub const RAW: u64 = 0x55;

/// Content codecs a block can be tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Codec {
    /// Compact self-describing binary tree encoding (0x71).
    DagCbor,
    /// Human-readable tree encoding (0x0129).
    DagJson,
    /// Opaque bytes (0x55).
    Raw,
}

impl Codec {
    /// The multicodec table value.
    pub const fn code(&self) -> u64 {
        match self {
            Self::DagCbor => DAG_CBOR,
            Self::DagJson => DAG_JSON,
            Self::Raw => RAW,
        }
    }

    /// Reverse-map a multicodec value. Returns `None` for codecs iptsdb
    /// does not handle.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            DAG_CBOR => Some(Self::DagCbor),
            DAG_JSON => Some(Self::DagJson),
            RAW => Some(Self::Raw),
            _ => None,
        }
    }

    /// Canonical multicodec name, as used on the node HTTP API.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DagCbor => "dag-cbor",
            Self::DagJson => "dag-json",
            Self::Raw => "raw",
        }
    }

    /// Whether blocks in this codec decode to a tree (as opposed to raw bytes).
    pub const fn is_tree(&self) -> bool {
        !matches!(self, Self::Raw)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = TypeError;

    /// Accepts the canonical names plus the short `cbor`/`json` aliases older
    /// clients pass to `dag put`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dag-cbor" | "cbor" => Ok(Self::DagCbor),
            "dag-json" | "json" => Ok(Self::DagJson),
            "raw" => Ok(Self::Raw),
            other => Err(TypeError::UnknownCodec(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip() {
        for codec in [Codec::DagCbor, Codec::DagJson, Codec::Raw] {
            assert_eq!(Codec::from_code(codec.code()), Some(codec));
        }
    }

    #[test]
    fn binary_tree_codec_is_0x71() {
        assert_eq!(Codec::DagCbor.code(), 0x71);
    }

    #[test]
    fn unknown_code() {
        assert_eq!(Codec::from_code(0x300001), None);
    }

    #[test]
    fn parse_names_and_aliases() {
        assert_eq!("dag-cbor".parse::<Codec>().unwrap(), Codec::DagCbor);
        assert_eq!("cbor".parse::<Codec>().unwrap(), Codec::DagCbor);
        assert_eq!("json".parse::<Codec>().unwrap(), Codec::DagJson);
        assert_eq!("raw".parse::<Codec>().unwrap(), Codec::Raw);
        assert!(matches!(
            "protobuf".parse::<Codec>(),
            Err(TypeError::UnknownCodec(_))
        ));
    }

    #[test]
    fn display_is_canonical_name() {
        assert_eq!(Codec::DagJson.to_string(), "dag-json");
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Codec::DagCbor).unwrap();
        assert_eq!(json, "\"dag-cbor\"");
        let parsed: Codec = serde_json::from_str("\"raw\"").unwrap();
        assert_eq!(parsed, Codec::Raw);
    }

    #[test]
    fn raw_is_not_a_tree() {
        assert!(Codec::DagCbor.is_tree());
        assert!(!Codec::Raw.is_tree());
    }
}
