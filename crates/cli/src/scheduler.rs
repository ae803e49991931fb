// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal pool scheduler for simulation
//!
//! Writes ready nodes under the node root and fills requests from them in
//! queue order. Works directly on the [`MemoryStore`] tree, outside any
//! client session.

use anyhow::Result;
use nodepool_core::{path, NodeMetadata, NodeRequest, PoolConfig, RequestState};
use nodepool_store::MemoryStore;
use serde_json::json;
use std::collections::HashMap;

pub struct Scheduler {
    store: MemoryStore,
    node_root: String,
    request_root: String,
    /// Unallocated node ids by pool label
    ready: HashMap<String, Vec<String>>,
    next_node: u64,
}

impl Scheduler {
    pub fn new(store: MemoryStore, config: &PoolConfig) -> Self {
        Self {
            store,
            node_root: config.node_path(),
            request_root: config.request_path(),
            ready: HashMap::new(),
            next_node: 1,
        }
    }

    /// Build `count` ready nodes for `label`, returning their ids
    pub fn provision(&mut self, count: usize, label: &str) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = format!("{:010}", self.next_node);
            let metadata = NodeMetadata::new()
                .with_label(label)
                .with_state("ready")
                .with_interface_ip(format!("10.0.{}.{}", self.next_node / 256, self.next_node % 256))
                .with_attribute("provider", json!("simulated"));
            self.next_node += 1;

            self.store
                .put(&path::join(&self.node_root, &id), &metadata.to_json()?)?;
            tracing::debug!(node = id.as_str(), label, "node provisioned");
            ids.push(id);
        }
        self.ready
            .entry(label.to_string())
            .or_default()
            .extend(ids.iter().cloned());
        Ok(ids)
    }

    pub fn ready_count(&self, label: &str) -> usize {
        self.ready.get(label).map_or(0, Vec::len)
    }

    /// Handle every open request once.
    ///
    /// A request gets `per_request` nodes of its label, or is marked failed
    /// when that many are not ready. Returns the paths of requests touched.
    pub fn run_once(&mut self, per_request: usize) -> Result<Vec<String>> {
        let mut handled = Vec::new();
        for request_path in self.store.children(&self.request_root) {
            let Some(bytes) = self.store.get(&request_path) else {
                continue;
            };
            let request = NodeRequest::from_json(&request_path, &bytes)?;
            if request.state() != RequestState::Requested {
                continue;
            }

            let ready = self.ready.entry(request.pool_label().to_string()).or_default();
            let updated = if per_request == 0 || ready.len() < per_request {
                tracing::warn!(
                    request = request_path.as_str(),
                    label = request.pool_label(),
                    "not enough ready nodes"
                );
                request.with_state(RequestState::Failed)
            } else {
                let nodes: Vec<String> = ready.drain(..per_request).collect();
                tracing::info!(
                    request = request_path.as_str(),
                    nodes = ?nodes,
                    "request fulfilled"
                );
                request
                    .with_allocated_nodes(nodes)
                    .with_state(RequestState::Fulfilled)
            };

            self.store.set_data(&request_path, &updated.to_json()?)?;
            handled.push(request_path);
        }
        Ok(handled)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
