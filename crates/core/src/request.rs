// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request record stored under the request namespace
//!
//! The JSON encoding is shared with the pool scheduler, which fills in
//! `allocatedNodes` and `state` in place. Field names are fixed by that
//! contract.

use crate::error::MalformedRecord;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a request as reported by the pool scheduler
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    /// Written by this client, not yet seen by the scheduler
    #[default]
    Requested,
    /// Scheduler is provisioning nodes
    Pending,
    /// `allocatedNodes` is final
    Fulfilled,
    /// Scheduler gave up on the request
    Failed,
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestState::Requested => "requested",
            RequestState::Pending => "pending",
            RequestState::Fulfilled => "fulfilled",
            RequestState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A request for one or more nodes from the pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRequest {
    /// Opaque tag naming the kind of work the consumer wants the node for
    consumer_label: String,
    /// Label the pool scheduler uses to pick a node type
    pool_label: String,
    /// Store-assigned identity, `None` until placed
    #[serde(rename = "nodePoolID")]
    node_pool_id: Option<String>,
    /// Node paths (or node ids relative to the node root) written by the scheduler
    #[serde(default)]
    allocated_nodes: Vec<String>,
    #[serde(default)]
    state: RequestState,
    /// Full store path; local only, never serialized
    #[serde(skip)]
    path: Option<String>,
}

impl NodeRequest {
    pub fn new(pool_label: impl Into<String>, consumer_label: impl Into<String>) -> Self {
        Self {
            consumer_label: consumer_label.into(),
            pool_label: pool_label.into(),
            node_pool_id: None,
            allocated_nodes: Vec::new(),
            state: RequestState::Requested,
            path: None,
        }
    }

    /// Record where the store placed this request and the identity derived from it
    pub fn placed(mut self, path: impl Into<String>, id: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self.node_pool_id = Some(id.into());
        self
    }

    /// Scheduler-side update: set the allocation list
    pub fn with_allocated_nodes(mut self, nodes: Vec<String>) -> Self {
        self.allocated_nodes = nodes;
        self
    }

    /// Scheduler-side update: set the request state
    pub fn with_state(mut self, state: RequestState) -> Self {
        self.state = state;
        self
    }

    pub fn consumer_label(&self) -> &str {
        &self.consumer_label
    }

    pub fn pool_label(&self) -> &str {
        &self.pool_label
    }

    pub fn id(&self) -> Option<&str> {
        self.node_pool_id.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn allocated_nodes(&self) -> &[String] {
        &self.allocated_nodes
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_fulfilled(&self) -> bool {
        self.state == RequestState::Fulfilled
    }

    pub fn is_failed(&self) -> bool {
        self.state == RequestState::Failed
    }

    /// Encode as the UTF-8 JSON payload stored at the request path
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a payload read from `path`.
    ///
    /// The returned record carries `path`; the identity comes from the payload.
    pub fn from_json(path: &str, bytes: &[u8]) -> Result<Self, MalformedRecord> {
        let mut request: NodeRequest =
            serde_json::from_slice(bytes).map_err(|e| MalformedRecord::new(path, e.to_string()))?;

        if request.pool_label.is_empty() {
            return Err(MalformedRecord::new(path, "poolLabel is empty"));
        }
        if request.consumer_label.is_empty() {
            return Err(MalformedRecord::new(path, "consumerLabel is empty"));
        }
        if request.allocated_nodes.iter().any(String::is_empty) {
            return Err(MalformedRecord::new(path, "allocatedNodes contains an empty entry"));
        }

        request.path = Some(path.to_string());
        Ok(request)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
