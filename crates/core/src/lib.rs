// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodepool-core: shared types for the node pool client
//!
//! This crate provides:
//! - The request record exchanged with the pool scheduler
//! - Node metadata and lock-holding node handles
//! - A pure lock state machine keyed by store path
//! - Path helpers, including request identity derivation
//! - TOML-backed client configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod lock;
pub mod node;
pub mod path;
pub mod request;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, PoolConfig, DEFAULT_PRIORITY};
pub use error::{InvalidPath, MalformedRecord};
pub use lock::{LockInput, LockState, LockToken, LockTransition, PathLock, SessionId};
pub use node::{NodeHandle, NodeMetadata};
pub use path::id_for_path;
pub use request::{NodeRequest, RequestState};
