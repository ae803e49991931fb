// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pool client operations

use nodepool_core::{ConfigError, InvalidPath, MalformedRecord, SessionId};
use nodepool_store::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of [`crate::PoolClient`]
#[derive(Debug, Error)]
pub enum PoolError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPath),
    #[error("lock on {path} is held by session {holder}")]
    LockUnavailable { path: String, holder: SessionId },
    #[error("store error: {0}")]
    Store(StoreError),
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecord),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("request {id} has no allocated nodes")]
    NotAllocated { id: String },
    #[error("request has not been placed in the store")]
    NotPlaced,
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<StoreError> for PoolError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LockHeld { path, holder } => PoolError::LockUnavailable { path, holder },
            other => PoolError::Store(other),
        }
    }
}

impl PoolError {
    /// Whether the store reported the path as absent
    pub fn is_no_node(&self) -> bool {
        matches!(self, PoolError::Store(StoreError::NoNode(_)))
    }
}

/// A cleanup step that failed after the outcome was already decided
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanupError {
    #[error("failed to release lock on {path}: {source}")]
    Release {
        path: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to delete {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: StoreError,
    },
}

impl CleanupError {
    pub fn path(&self) -> &str {
        match self {
            CleanupError::Release { path, .. } | CleanupError::Delete { path, .. } => path,
        }
    }
}
