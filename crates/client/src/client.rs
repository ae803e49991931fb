// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool client: request, accept and release nodes
//!
//! Single-use node life cycle, from the consumer's side:
//!
//! 1. [`PoolClient::request_node`] writes an ephemeral sequential request.
//! 2. The pool scheduler fills in `allocatedNodes`; the caller notices via
//!    [`PoolClient::watch_request`] or by polling [`PoolClient::refresh_request`].
//! 3. [`PoolClient::accept_nodes`] locks every allocated node or none of them,
//!    and deletes the request either way.
//! 4. [`PoolClient::release_node`] gives a node back once the work is done.

use crate::error::{CleanupError, PoolError};
use crate::outcome::{AcceptOutcome, CleanupReport};
use nodepool_core::{
    id_for_path, path, LockToken, MalformedRecord, NodeHandle, NodeMetadata, NodeRequest,
    PoolConfig,
};
use nodepool_store::{CoordinationStore, StoreError, WatchEvent};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Client for one store session
///
/// Cheap to clone; clones share the session and configuration and may be
/// used from concurrent tasks.
#[derive(Clone)]
pub struct PoolClient<S> {
    store: S,
    config: Arc<PoolConfig>,
}

impl<S: CoordinationStore> PoolClient<S> {
    pub fn new(store: S, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn request_root(&self) -> String {
        self.config.request_path()
    }

    pub fn request_lock_root(&self) -> String {
        self.config.request_lock_path()
    }

    pub fn node_root(&self) -> String {
        self.config.node_path()
    }

    pub fn priority(&self) -> u32 {
        self.config.priority
    }

    pub fn credentials_id(&self) -> Option<&str> {
        self.config.credentials_id.as_deref()
    }

    /// Ask the pool for a node.
    ///
    /// Returns the placed, still pending request. Its entry exists in the
    /// store when this returns; allocation has to be observed separately.
    ///
    /// If the store hands back a path with no sequence suffix the entry is
    /// deleted and [`PoolError::InvalidPath`] returned. A failure of that
    /// delete is logged and does not replace the error; the entry is
    /// ephemeral and goes away with the session.
    pub async fn request_node(
        &self,
        pool_label: &str,
        consumer_label: &str,
    ) -> Result<NodeRequest, PoolError> {
        let request = NodeRequest::new(pool_label, consumer_label);
        let prefix = self.config.request_prefix();
        tracing::info!(
            prefix = prefix.as_str(),
            pool_label,
            consumer_label,
            "creating request"
        );

        let payload = request.to_json()?;
        let path = self
            .store
            .create_sequential_ephemeral(&prefix, &payload)
            .await?;

        let id = match id_for_path(&path) {
            Ok(id) => id.to_string(),
            Err(e) => {
                tracing::error!(path = path.as_str(), "store assigned a path with no sequence");
                let cleanup = self.delete_node(&path).await;
                if !cleanup.is_clean() {
                    tracing::warn!(
                        path = path.as_str(),
                        failures = cleanup.failures().len(),
                        "unsequenced request left behind until session ends"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(path = path.as_str(), id = id.as_str(), "request created");
        Ok(request.placed(path, id))
    }

    /// Re-read a request to pick up the scheduler's changes.
    ///
    /// Identity and path are kept from the store path, not the payload.
    pub async fn refresh_request(&self, request: &NodeRequest) -> Result<NodeRequest, PoolError> {
        let path = request.path().ok_or(PoolError::NotPlaced)?;
        let id = id_for_path(path)?;
        let bytes = self.store.read(path).await?;
        let fresh = NodeRequest::from_json(path, &bytes)?;
        Ok(fresh.placed(path, id))
    }

    /// Register a one-shot watch on a request's entry
    pub async fn watch_request(
        &self,
        request: &NodeRequest,
    ) -> Result<oneshot::Receiver<WatchEvent>, PoolError> {
        let path = request.path().ok_or(PoolError::NotPlaced)?;
        Ok(self.store.watch(path).await?)
    }

    /// Lock every node allocated to `request`, or none of them.
    ///
    /// The request entry is deleted whether or not locking succeeds, also
    /// when nothing was allocated; a caller that fails here starts over with
    /// a new request. Release and delete failures end up in the outcome's
    /// cleanup report. Only a request that was never placed is left alone.
    pub async fn accept_nodes(&self, request: NodeRequest) -> AcceptOutcome {
        let Some(request_path) = request.path().map(str::to_string) else {
            return AcceptOutcome::new(Err(PoolError::NotPlaced), CleanupReport::new());
        };
        let id = request.id().unwrap_or_default().to_string();

        if request.allocated_nodes().is_empty() {
            tracing::warn!(
                request = id.as_str(),
                state = %request.state(),
                "no nodes allocated"
            );
            let cleanup = self.delete_node(&request_path).await;
            return AcceptOutcome::new(Err(PoolError::NotAllocated { id }), cleanup);
        }

        let mut cleanup = CleanupReport::new();
        let result = self
            .lock_all(&id, request.allocated_nodes(), &mut cleanup)
            .await;

        // regardless of the outcome the request has been consumed
        cleanup.merge(self.delete_node(&request_path).await);

        match &result {
            Ok(nodes) => tracing::info!(request = id.as_str(), count = nodes.len(), "nodes accepted"),
            Err(e) => tracing::warn!(request = id.as_str(), error = %e, "accept failed"),
        }

        AcceptOutcome::new(result, cleanup)
    }

    async fn lock_all(
        &self,
        id: &str,
        nodes: &[String],
        cleanup: &mut CleanupReport,
    ) -> Result<Vec<NodeHandle>, PoolError> {
        let mut accepted: Vec<NodeHandle> = Vec::with_capacity(nodes.len());

        for entry in nodes {
            let node_path = self.resolve_node_path(entry);
            tracing::info!(node = node_path.as_str(), request = id, "accepting node");

            let token = match self.store.acquire_lock(&node_path).await {
                Ok(token) => token,
                Err(e) => {
                    tracing::warn!(node = node_path.as_str(), error = %e, "failed to lock node");
                    self.roll_back(accepted, None, cleanup).await;
                    return Err(e.into());
                }
            };

            match self.read_metadata(&node_path).await {
                Ok(metadata) => {
                    tracing::debug!(node = node_path.as_str(), data = ?metadata, "node data");
                    accepted.push(NodeHandle::locked(token, metadata));
                }
                Err(e) => {
                    tracing::warn!(node = node_path.as_str(), error = %e, "failed to read locked node");
                    self.roll_back(accepted, Some(token), cleanup).await;
                    return Err(e);
                }
            }
        }

        Ok(accepted)
    }

    /// Release every lock taken during a failed accept.
    ///
    /// Each release is attempted even when an earlier one fails.
    async fn roll_back(
        &self,
        accepted: Vec<NodeHandle>,
        pending: Option<LockToken>,
        cleanup: &mut CleanupReport,
    ) {
        let tokens = accepted.into_iter().map(NodeHandle::into_lock).chain(pending);
        for token in tokens {
            if let Err(e) = self.store.release_lock(&token).await {
                tracing::warn!(node = token.path(), error = %e, "failed to release lock on node");
                cleanup.push(CleanupError::Release {
                    path: token.path().to_string(),
                    source: e,
                });
            }
        }
    }

    /// Absolute entries are used as-is. Relative entries are node ids,
    /// optionally written relative to the namespace (`nodes/<id>`), and
    /// resolve under the node root.
    fn resolve_node_path(&self, entry: &str) -> String {
        if entry.starts_with('/') {
            return entry.to_string();
        }
        let rooted = format!("{}/", self.config.node_root);
        let id = entry.strip_prefix(rooted.as_str()).unwrap_or(entry);
        path::join(&self.config.node_path(), id)
    }

    async fn read_metadata(&self, node_path: &str) -> Result<NodeMetadata, PoolError> {
        let bytes = self.store.read(node_path).await?;
        Ok(NodeMetadata::from_json(node_path, &bytes)?)
    }

    /// Give back a node taken by [`Self::accept_nodes`]
    pub async fn release_node(&self, node: NodeHandle) -> Result<(), PoolError> {
        self.store.release_lock(node.lock()).await?;
        tracing::info!(node = node.path(), "node released");
        Ok(())
    }

    /// Best-effort delete; never fails, an already absent path is success
    pub async fn delete_node(&self, path: &str) -> CleanupReport {
        let mut report = CleanupReport::new();
        match self.store.delete(path).await {
            Ok(()) => tracing::debug!(path, "deleted"),
            Err(StoreError::NoNode(_)) => tracing::debug!(path, "already deleted"),
            Err(e) => {
                tracing::warn!(path, error = %e, "failed to delete node");
                report.push(CleanupError::Delete {
                    path: path.to_string(),
                    source: e,
                });
            }
        }
        report
    }

    /// Decode the JSON object stored at `path`
    pub async fn get_znode(&self, path: &str) -> Result<Map<String, Value>, PoolError> {
        let bytes = self.store.read(path).await?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(MalformedRecord::new(path, "payload is not a JSON object").into()),
            Err(e) => Err(MalformedRecord::new(path, e.to_string()).into()),
        }
    }

    pub async fn node_exists(&self, path: &str) -> Result<bool, PoolError> {
        Ok(self.store.exists(path).await?)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
