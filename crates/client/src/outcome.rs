// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Results that keep best-effort cleanup failures apart from the primary outcome

use crate::error::{CleanupError, PoolError};
use nodepool_core::NodeHandle;

/// Cleanup failures collected during an operation
///
/// Every entry has already been logged. None of them change whether the
/// operation they belong to succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    failures: Vec<CleanupError>,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: CleanupError) {
        self.failures.push(failure);
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[CleanupError] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<CleanupError> {
        self.failures
    }
}

/// Outcome of accepting a request's allocated nodes
///
/// `result` is either every node, locked, or an error with no locks held.
#[must_use]
#[derive(Debug)]
pub struct AcceptOutcome {
    pub result: Result<Vec<NodeHandle>, PoolError>,
    pub cleanup: CleanupReport,
}

impl AcceptOutcome {
    pub(crate) fn new(result: Result<Vec<NodeHandle>, PoolError>, cleanup: CleanupReport) -> Self {
        Self { result, cleanup }
    }

    pub fn is_accepted(&self) -> bool {
        self.result.is_ok()
    }

    /// Accepted nodes, empty on failure
    pub fn nodes(&self) -> &[NodeHandle] {
        match &self.result {
            Ok(nodes) => nodes,
            Err(_) => &[],
        }
    }

    /// Drop the cleanup report and keep the primary result
    pub fn into_result(self) -> Result<Vec<NodeHandle>, PoolError> {
        self.result
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
