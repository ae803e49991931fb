// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Coordination-store seam
//!
//! [`CoordinationStore`] is the only way the pool client touches shared
//! state. One value of the trait is one store session: entries it creates
//! ephemerally and locks it holds disappear when the session ends.

pub mod memory;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use memory::{MemorySession, MemoryStore};
pub use traced::TracedStore;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

use async_trait::async_trait;
use nodepool_core::{LockToken, SessionId};
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no node at {0}")]
    NoNode(String),
    #[error("node already exists at {0}")]
    NodeExists(String),
    #[error("node at {0} has children")]
    NotEmpty(String),
    #[error("malformed path: {0:?}")]
    BadPath(String),
    #[error("lock on {path} is held by session {holder}")]
    LockHeld { path: String, holder: SessionId },
    #[error("lock on {0} is not held by this token")]
    LockNotHeld(String),
    #[error("session {0} has expired")]
    SessionExpired(SessionId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Store operation kinds, used to target injected failures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Read,
    Exists,
    Delete,
    AcquireLock,
    ReleaseLock,
    Watch,
}

/// Change observed by a one-shot watch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEvent {
    Created(String),
    DataChanged(String),
    Deleted(String),
}

impl WatchEvent {
    pub fn path(&self) -> &str {
        match self {
            WatchEvent::Created(p) | WatchEvent::DataChanged(p) | WatchEvent::Deleted(p) => p,
        }
    }
}

/// A session on a hierarchical coordination store
#[async_trait]
pub trait CoordinationStore: Clone + Send + Sync + 'static {
    /// Session this handle operates as
    fn session_id(&self) -> SessionId;

    /// Create `<prefix><sequence>` as an entry owned by this session.
    ///
    /// Missing parents are created as persistent entries. Returns the
    /// assigned path.
    async fn create_sequential_ephemeral(
        &self,
        prefix: &str,
        payload: &[u8],
    ) -> Result<String, StoreError>;

    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    async fn exists(&self, path: &str) -> Result<bool, StoreError>;

    /// Remove an entry; fails with [`StoreError::NoNode`] if absent
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Take the lock bound to `path`, failing fast if another holder has it
    async fn acquire_lock(&self, path: &str) -> Result<LockToken, StoreError>;

    async fn release_lock(&self, token: &LockToken) -> Result<(), StoreError>;

    /// Register a one-shot watch; the receiver resolves on the next change
    async fn watch(&self, path: &str) -> Result<oneshot::Receiver<WatchEvent>, StoreError>;
}
