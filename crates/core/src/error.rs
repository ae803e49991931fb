// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared by every layer of the client

use thiserror::Error;

/// A store path that does not have the `<priority>-<sequence>` shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request path: {path}")]
pub struct InvalidPath {
    pub path: String,
}

impl InvalidPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A payload that could not be decoded into its expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record at {path}: {reason}")]
pub struct MalformedRecord {
    pub path: String,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
