// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodepool-client: claim nodes from a node pool
//!
//! Requests are written to a shared coordination store, allocated by an
//! external pool scheduler, and accepted here by locking every allocated
//! node. See [`PoolClient`] for the life cycle.

mod client;
mod error;
mod outcome;

pub use client::PoolClient;
pub use error::{CleanupError, PoolError};
pub use outcome::{AcceptOutcome, CleanupReport};
