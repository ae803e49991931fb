// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Allocated nodes and the handles used to hold them

use crate::error::MalformedRecord;
use crate::lock::LockToken;
use crate::path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata the pool scheduler writes at `nodes/<node-id>`
///
/// Any JSON object is valid; the typed fields are read when present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Pool label the node was built for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_port: Option<u16>,
    /// Everything else the scheduler recorded
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl NodeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_interface_ip(mut self, ip: impl Into<String>) -> Self {
        self.interface_ip = Some(ip.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a node payload; fails only when it is not a JSON object or a
    /// typed field has the wrong type
    pub fn from_json(path: &str, bytes: &[u8]) -> Result<Self, MalformedRecord> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| MalformedRecord::new(path, e.to_string()))?;
        if !value.is_object() {
            return Err(MalformedRecord::new(path, "payload is not a JSON object"));
        }
        serde_json::from_value(value).map_err(|e| MalformedRecord::new(path, e.to_string()))
    }
}

/// A node this client holds the lock for
///
/// Only constructed once the lock has been granted, so holding a handle
/// means holding the node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeHandle {
    path: String,
    metadata: NodeMetadata,
    lock: LockToken,
}

impl NodeHandle {
    pub fn locked(lock: LockToken, metadata: NodeMetadata) -> Self {
        Self {
            path: lock.path().to_string(),
            metadata,
            lock,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final path segment, the scheduler's node id
    pub fn node_id(&self) -> &str {
        path::last_segment(&self.path)
    }

    /// Snapshot read right after the lock was taken
    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    pub fn lock(&self) -> &LockToken {
        &self.lock
    }

    pub fn into_lock(self) -> LockToken {
        self.lock
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
