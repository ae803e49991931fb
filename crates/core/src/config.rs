// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration pointing at a local store.

use crate::path;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Priority used when none is configured; lower values are served first
pub const DEFAULT_PRIORITY: u32 = 100;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Process-wide settings for a pool client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Store connection descriptor, e.g. `zk1:2181,zk2:2181`
    pub connection: String,
    /// Absolute namespace every other root lives under
    pub namespace: String,
    pub request_root: String,
    /// Reserved for locking request entries; unused by the accept protocol
    pub request_lock_root: String,
    pub node_root: String,
    pub priority: u32,
    /// Reference to credentials for reaching allocated nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_id: Option<String>,
    /// How long the store keeps a silent session alive
    #[serde(with = "humantime_serde")]
    pub session_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            connection: "127.0.0.1:2181".to_string(),
            namespace: "/nodepool".to_string(),
            request_root: "requests".to_string(),
            request_lock_root: "requests-lock".to_string(),
            node_root: "nodes".to_string(),
            priority: DEFAULT_PRIORITY,
            credentials_id: None,
            session_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolConfig {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_credentials_id(mut self, id: impl Into<String>) -> Self {
        self.credentials_id = Some(id.into());
        self
    }

    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(file: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(file)
            .map_err(|e| ConfigError::Read(file.display().to_string(), e))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.trim().is_empty() {
            return Err(ConfigError::Invalid("connection is empty".into()));
        }
        if self.namespace == "/" || !path::is_valid(&self.namespace) {
            return Err(ConfigError::Invalid(format!(
                "namespace must be an absolute path below /: {:?}",
                self.namespace
            )));
        }
        for (name, root) in [
            ("request_root", &self.request_root),
            ("request_lock_root", &self.request_lock_root),
            ("node_root", &self.node_root),
        ] {
            if root.is_empty() || root.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a single path segment: {:?}",
                    name, root
                )));
            }
        }
        if self.session_timeout.is_zero() {
            return Err(ConfigError::Invalid("session_timeout must be positive".into()));
        }
        Ok(())
    }

    /// Absolute path of the request namespace
    pub fn request_path(&self) -> String {
        path::join(&self.namespace, &self.request_root)
    }

    /// Absolute path of the reserved request-lock namespace
    pub fn request_lock_path(&self) -> String {
        path::join(&self.namespace, &self.request_lock_root)
    }

    /// Absolute path of the node namespace
    pub fn node_path(&self) -> String {
        path::join(&self.namespace, &self.node_root)
    }

    /// Prefix handed to the store for sequential request creation
    pub fn request_prefix(&self) -> String {
        format!(
            "{}/{}{}",
            self.request_path(),
            self.priority,
            path::SEQUENCE_SEPARATOR
        )
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
