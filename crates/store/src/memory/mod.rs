// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process coordination store
//!
//! [`MemoryStore`] is the shared tree; each [`MemorySession`] is one client
//! session on it. Ephemeral entries and locks belong to the session that
//! created them and vanish when it is closed or expires.
//!
//! The store-level helpers (`put`, `set_data`, ...) act outside any session
//! and are how a simulated pool scheduler writes nodes and allocations.

mod tree;

use crate::{CoordinationStore, StoreError, WatchEvent};
use async_trait::async_trait;
use nodepool_core::{Clock, LockToken, SessionId, SystemClock};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tree::Tree;

const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared in-memory path tree
#[derive(Clone)]
pub struct MemoryStore<C: Clock = SystemClock> {
    tree: Arc<Mutex<Tree>>,
    clock: C,
    session_timeout: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree::default())),
            clock,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    /// Timeout applied to sessions opened after this call
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a new client session
    pub fn session(&self) -> MemorySession<C> {
        let id = self
            .tree()
            .open_session(self.clock.now(), self.session_timeout);
        tracing::debug!(session = %id, "session opened");
        MemorySession {
            store: self.clone(),
            id,
        }
    }

    /// Create or overwrite a persistent entry, creating parents as needed
    pub fn put(&self, path: &str, data: &[u8]) -> Result<(), StoreError> {
        self.tree().put(path, data)
    }

    /// Overwrite an existing entry
    pub fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StoreError> {
        self.tree().set_data(path, data)
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.tree().read(path).ok()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.tree().exists(path).unwrap_or(false)
    }

    /// Full paths of the direct children of `path`, in sequence order
    pub fn children(&self, path: &str) -> Vec<String> {
        self.tree().children(path)
    }

    pub fn lock_holder(&self, path: &str) -> Option<SessionId> {
        self.tree().lock_holder(path)
    }

    pub fn is_session_open(&self, id: SessionId) -> bool {
        self.tree().check_session(id).is_ok()
    }

    /// End a session as if its connection dropped
    pub fn close_session(&self, id: SessionId) {
        if self.tree().close_session(id) {
            tracing::debug!(session = %id, "session closed");
        }
    }

    /// Close every session whose last heartbeat is older than its timeout
    pub fn expire_stale_sessions(&self) -> Vec<SessionId> {
        let mut tree = self.tree();
        let stale: Vec<SessionId> = tree
            .sessions
            .iter()
            .filter(|(_, s)| self.clock.elapsed_since(s.last_heartbeat) > s.timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            tree.close_session(*id);
            tracing::info!(session = %id, "session expired");
        }
        stale
    }
}

/// One client session on a [`MemoryStore`]
#[derive(Clone)]
pub struct MemorySession<C: Clock = SystemClock> {
    store: MemoryStore<C>,
    id: SessionId,
}

impl<C: Clock> MemorySession<C> {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn store(&self) -> &MemoryStore<C> {
        &self.store
    }

    /// Keep the session alive
    pub fn heartbeat(&self) -> Result<(), StoreError> {
        self.store.tree().heartbeat(self.id, self.store.clock.now())
    }

    /// End the session, dropping its ephemeral entries and locks
    pub fn close(&self) {
        self.store.close_session(self.id);
    }

    fn live_tree(&self) -> Result<MutexGuard<'_, Tree>, StoreError> {
        let tree = self.store.tree();
        tree.check_session(self.id)?;
        Ok(tree)
    }
}

#[async_trait]
impl<C: Clock> CoordinationStore for MemorySession<C> {
    fn session_id(&self) -> SessionId {
        self.id
    }

    async fn create_sequential_ephemeral(
        &self,
        prefix: &str,
        payload: &[u8],
    ) -> Result<String, StoreError> {
        self.live_tree()?
            .create_sequential(prefix, payload, Some(self.id))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.live_tree()?.read(path)
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        self.live_tree()?.exists(path)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.live_tree()?.delete(path)
    }

    async fn acquire_lock(&self, path: &str) -> Result<LockToken, StoreError> {
        self.live_tree()?.acquire_lock(path, self.id)
    }

    async fn release_lock(&self, token: &LockToken) -> Result<(), StoreError> {
        self.live_tree()?.release_lock(token)
    }

    async fn watch(&self, path: &str) -> Result<oneshot::Receiver<WatchEvent>, StoreError> {
        self.live_tree()?.watch(path)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
