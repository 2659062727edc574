use std::path::Path;

use ipts_store::KuboConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Top-level configuration, usually read from `ipts.toml`:
///
/// ```toml
/// strict_floats = true
///
/// [kubo]
/// api_url = "http://localhost:5001"
/// timeout_secs = 60
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IptsConfig {
    /// When `false`, float vectors with a trailing partial value are
    /// truncated instead of rejected.
    pub strict_floats: bool,
    /// Store node connection settings.
    pub kubo: KuboConfig,
}

impl Default for IptsConfig {
    fn default() -> Self {
        Self {
            strict_floats: true,
            kubo: KuboConfig::default(),
        }
    }
}

impl IptsConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SdkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// [`load`](Self::load) if the file exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> SdkResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
