// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::memory::{MemorySession, MemoryStore};
use crate::{CoordinationStore, StoreError, StoreOp, WatchEvent};
use async_trait::async_trait;
use nodepool_core::{LockToken, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create { prefix: String },
    Read { path: String },
    Exists { path: String },
    Delete { path: String },
    AcquireLock { path: String },
    ReleaseLock { path: String },
    Watch { path: String },
}

impl StoreCall {
    fn op(&self) -> StoreOp {
        match self {
            StoreCall::Create { .. } => StoreOp::Create,
            StoreCall::Read { .. } => StoreOp::Read,
            StoreCall::Exists { .. } => StoreOp::Exists,
            StoreCall::Delete { .. } => StoreOp::Delete,
            StoreCall::AcquireLock { .. } => StoreOp::AcquireLock,
            StoreCall::ReleaseLock { .. } => StoreOp::ReleaseLock,
            StoreCall::Watch { .. } => StoreOp::Watch,
        }
    }

    fn path(&self) -> &str {
        match self {
            StoreCall::Create { prefix } => prefix,
            StoreCall::Read { path }
            | StoreCall::Exists { path }
            | StoreCall::Delete { path }
            | StoreCall::AcquireLock { path }
            | StoreCall::ReleaseLock { path }
            | StoreCall::Watch { path } => path,
        }
    }
}

/// Session on a [`MemoryStore`] that records calls and injects failures
#[derive(Clone)]
pub struct FakeStore {
    session: MemorySession,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failures: Arc<Mutex<HashMap<(StoreOp, String), StoreError>>>,
}

impl FakeStore {
    /// Open a recording session on `store`
    pub fn new(store: &MemoryStore) -> Self {
        Self {
            session: store.session(),
            calls: Arc::default(),
            failures: Arc::default(),
        }
    }

    pub fn session(&self) -> &MemorySession {
        &self.session
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Paths passed to `acquire_lock`, in call order
    pub fn lock_attempts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::AcquireLock { path } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Paths passed to `release_lock`, in call order
    pub fn lock_releases(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::ReleaseLock { path } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Make every `op` on `path` fail with `error` until cleared.
    ///
    /// For `Create` the path is the prefix passed in.
    pub fn fail(&self, op: StoreOp, path: impl Into<String>, error: StoreError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((op, path.into()), error);
    }

    pub fn clear_failures(&self) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        let key = (call.op(), call.path().to_string());
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CoordinationStore for FakeStore {
    fn session_id(&self) -> SessionId {
        self.session.id()
    }

    async fn create_sequential_ephemeral(
        &self,
        prefix: &str,
        payload: &[u8],
    ) -> Result<String, StoreError> {
        self.record(StoreCall::Create {
            prefix: prefix.to_string(),
        })?;
        self.session.create_sequential_ephemeral(prefix, payload).await
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.record(StoreCall::Read {
            path: path.to_string(),
        })?;
        self.session.read(path).await
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        self.record(StoreCall::Exists {
            path: path.to_string(),
        })?;
        self.session.exists(path).await
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Delete {
            path: path.to_string(),
        })?;
        self.session.delete(path).await
    }

    async fn acquire_lock(&self, path: &str) -> Result<LockToken, StoreError> {
        self.record(StoreCall::AcquireLock {
            path: path.to_string(),
        })?;
        self.session.acquire_lock(path).await
    }

    async fn release_lock(&self, token: &LockToken) -> Result<(), StoreError> {
        self.record(StoreCall::ReleaseLock {
            path: token.path().to_string(),
        })?;
        self.session.release_lock(token).await
    }

    async fn watch(&self, path: &str) -> Result<oneshot::Receiver<WatchEvent>, StoreError> {
        self.record(StoreCall::Watch {
            path: path.to_string(),
        })?;
        self.session.watch(path).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
