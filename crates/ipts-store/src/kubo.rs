//! Blocking client for the Kubo HTTP RPC API (`/api/v0/...`).
//!
//! Only the handful of calls iptsdb needs: `dag/put`, `block/put`,
//! `block/get` and `version` for availability probing. Every call is a
//! `POST`, as Kubo requires.

use std::time::Duration;

use ipts_crypto::ContentHasher;
use ipts_types::{Codec, ContentId, SHA3_384};
use reqwest::blocking::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::DagStore;

/// Connection settings for a Kubo node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KuboConfig {
    /// Base URL of the RPC API, without the `/api/v0` suffix.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Multihash function name passed to the node.
    pub hash: String,
    /// Pin blocks as they are written.
    pub pin: bool,
}

impl Default for KuboConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5001".into(),
            timeout_secs: 60,
            hash: "sha3-384".into(),
            pin: true,
        }
    }
}

/// `{"Cid": {"/": "bafy..."}}` from `dag/put`.
#[derive(Debug, Deserialize)]
struct DagPutResponse {
    #[serde(rename = "Cid")]
    cid: LinkObject,
}

#[derive(Debug, Deserialize)]
struct LinkObject {
    #[serde(rename = "/")]
    target: String,
}

/// `{"Key": "bafy...", "Size": 42}` from `block/put`.
#[derive(Debug, Deserialize)]
struct BlockPutResponse {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Size")]
    size: u64,
}

/// `{"Message": "...", "Code": 0, "Type": "error"}` on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "Message")]
    message: String,
}

/// Blocking HTTP client for a Kubo node.
#[derive(Clone, Debug)]
pub struct KuboClient {
    config: KuboConfig,
    http: Client,
}

impl KuboClient {
    pub fn new(config: KuboConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    /// Client for `api_url` with all other settings at their defaults.
    pub fn with_url(api_url: impl Into<String>) -> StoreResult<Self> {
        Self::new(KuboConfig {
            api_url: api_url.into(),
            ..KuboConfig::default()
        })
    }

    pub fn config(&self) -> &KuboConfig {
        &self.config
    }

    /// Returns `true` if the node answers `version`.
    pub fn is_available(&self) -> bool {
        match self.http.post(self.endpoint("version")).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, url = %self.config.api_url, "kubo not reachable");
                false
            }
        }
    }

    fn endpoint(&self, command: &str) -> String {
        format!("{}/api/v0/{command}", self.config.api_url.trim_end_matches('/'))
    }

    fn pin_flag(&self) -> &'static str {
        if self.config.pin {
            "true"
        } else {
            "false"
        }
    }

    fn file_part(data: &[u8]) -> multipart::Form {
        multipart::Form::new().part("file", multipart::Part::bytes(data.to_vec()).file_name("data"))
    }
}

impl DagStore for KuboClient {
    fn put(&self, data: &[u8], input: Codec, store: Codec) -> StoreResult<ContentId> {
        let resp = self
            .http
            .post(self.endpoint("dag/put"))
            .query(&[
                ("input-codec", input.name()),
                ("store-codec", store.name()),
                ("hash", self.config.hash.as_str()),
                ("pin", self.pin_flag()),
            ])
            .multipart(Self::file_part(data))
            .send()?;
        let body = check_status(resp)?.text()?;
        let id = parse_dag_put(&body)?;
        info!(id = %id, input = %input, store = %store, "dag put");
        Ok(id)
    }

    fn block_put(&self, data: &[u8], codec: Codec) -> StoreResult<ContentId> {
        let resp = self
            .http
            .post(self.endpoint("block/put"))
            .query(&[
                ("cid-codec", codec.name()),
                ("mhtype", self.config.hash.as_str()),
                ("pin", self.pin_flag()),
            ])
            .multipart(Self::file_part(data))
            .send()?;
        let body = check_status(resp)?.text()?;
        let (id, size) = parse_block_put(&body)?;
        debug!(id = %id, size, "block put");
        Ok(id)
    }

    fn block_get(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let resp = self
            .http
            .post(self.endpoint("block/get"))
            .query(&[("arg", id.to_string())])
            .send()?;
        let resp = match check_status(resp) {
            Err(StoreError::Api { message, .. }) if is_not_found_message(&message) => {
                return Err(StoreError::NotFound(*id))
            }
            other => other?,
        };
        let bytes = resp.bytes()?.to_vec();
        if id.hash_code() == SHA3_384 && !ContentHasher::verify(&bytes, id.as_cid().hash()) {
            return Err(StoreError::HashMismatch(*id));
        }
        debug!(id = %id, len = bytes.len(), "block get");
        Ok(bytes)
    }
}

fn check_status(resp: Response) -> StoreResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message: parse_error_message(&body),
    })
}

fn parse_dag_put(body: &str) -> StoreResult<ContentId> {
    let parsed: DagPutResponse = serde_json::from_str(body)
        .map_err(|e| StoreError::Response(format!("dag/put: {e}")))?;
    Ok(parsed.cid.target.parse()?)
}

fn parse_block_put(body: &str) -> StoreResult<(ContentId, u64)> {
    let parsed: BlockPutResponse = serde_json::from_str(body)
        .map_err(|e| StoreError::Response(format!("block/put: {e}")))?;
    Ok((parsed.key.parse()?, parsed.size))
}

/// The `Message` field of an error body, or the body itself.
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn is_not_found_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("not found")
}
