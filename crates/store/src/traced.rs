// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use crate::{CoordinationStore, StoreError, WatchEvent};
use async_trait::async_trait;
use nodepool_core::{LockToken, SessionId};
use tokio::sync::oneshot;
use tracing::Instrument;

/// Wrapper that adds tracing to any CoordinationStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CoordinationStore> CoordinationStore for TracedStore<S> {
    fn session_id(&self) -> SessionId {
        self.inner.session_id()
    }

    async fn create_sequential_ephemeral(
        &self,
        prefix: &str,
        payload: &[u8],
    ) -> Result<String, StoreError> {
        let span = tracing::info_span!("store.create", prefix, session = %self.session_id());

        async {
            tracing::debug!(payload_len = payload.len(), "creating");

            let start = std::time::Instant::now();
            let result = self.inner.create_sequential_ephemeral(prefix, payload).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(path) => tracing::info!(
                    path = path.as_str(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "created"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "create failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let result = self.inner.read(path).await;
        match &result {
            Ok(data) => tracing::trace!(path, len = data.len(), "read"),
            Err(e) => tracing::debug!(path, error = %e, "read failed"),
        }
        result
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        let result = self.inner.exists(path).await;
        tracing::trace!(path, exists = ?result.as_ref().ok(), "checked");
        result
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete", path);

        async {
            let result = self.inner.delete(path).await;
            // deleting an absent entry is routine during cleanup
            match &result {
                Ok(()) => tracing::info!("deleted"),
                Err(StoreError::NoNode(_)) => tracing::debug!("already absent"),
                Err(e) => tracing::warn!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn acquire_lock(&self, path: &str) -> Result<LockToken, StoreError> {
        let span = tracing::info_span!("store.lock", path, session = %self.session_id());

        async {
            let start = std::time::Instant::now();
            let result = self.inner.acquire_lock(path).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(token) => tracing::info!(
                    fence = token.fence(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "lock acquired"
                ),
                Err(StoreError::LockHeld { holder, .. }) => {
                    tracing::warn!(holder = %holder, "lock held elsewhere")
                }
                Err(e) => tracing::error!(error = %e, "lock failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn release_lock(&self, token: &LockToken) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.unlock", path = token.path(), fence = token.fence());

        async {
            let result = self.inner.release_lock(token).await;
            match &result {
                Ok(()) => tracing::info!("lock released"),
                Err(e) => tracing::warn!(error = %e, "release failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn watch(&self, path: &str) -> Result<oneshot::Receiver<WatchEvent>, StoreError> {
        let result = self.inner.watch(path).await;
        match &result {
            Ok(_) => tracing::debug!(path, "watch registered"),
            Err(e) => tracing::warn!(path, error = %e, "watch failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
