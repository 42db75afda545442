//! Manifest documents

use serde_json::{Map, Value};
use std::sync::OnceLock;

/// A manifest body with the digest reported by the registry
#[derive(Debug)]
pub struct Manifest {
    raw: Value,
    digest: Option<String>,
    history: OnceLock<Map<String, Value>>,
}

impl Manifest {
    pub fn new(raw: Value, digest: Option<String>) -> Self {
        Self {
            raw,
            digest,
            history: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// `Docker-Content-Digest` of the response the manifest came from
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn schema_version(&self) -> Option<u64> {
        self.raw.get("schemaVersion").and_then(Value::as_u64)
    }

    pub fn name(&self) -> Option<&str> {
        self.raw.get("name").and_then(Value::as_str)
    }

    pub fn tag(&self) -> Option<&str> {
        self.raw.get("tag").and_then(Value::as_str)
    }

    /// `fsLayers`, as returned by the registry
    pub fn layers(&self) -> Option<&Value> {
        self.raw.get("fsLayers")
    }

    /// `history[0].v1Compatibility`, decoded once
    ///
    /// Any missing key or undecodable JSON yields an empty map.
    pub fn history(&self) -> &Map<String, Value> {
        self.history.get_or_init(|| {
            self.raw
                .get("history")
                .and_then(|h| h.get(0))
                .and_then(|h| h.get("v1Compatibility"))
                .and_then(Value::as_str)
                .and_then(|s| serde_json::from_str::<Map<String, Value>>(s).ok())
                .unwrap_or_default()
        })
    }

    /// Creation timestamp from the history, if any
    pub fn created(&self) -> Option<&str> {
        self.history().get("created").and_then(Value::as_str)
    }
}

/// Raw result of a slim manifest GET, PUT back byte-for-byte when retagging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlimManifest {
    pub body: Vec<u8>,
    pub content_type: String,
    pub digest: Option<String>,
}
