// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulate command
//!
//! One consumer requests nodes, a simulated scheduler allocates them, and the
//! consumer accepts and releases them, all against a single [`MemoryStore`].

use crate::output::{self, OutputFormat};
use crate::scheduler::Scheduler;
use anyhow::anyhow;
use clap::Args;
use nodepool_client::PoolClient;
use nodepool_core::{PoolConfig, RequestState};
use nodepool_store::{CoordinationStore, MemoryStore, TracedStore};
use serde::Serialize;
use std::fmt;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Nodes the scheduler allocates to the request
    #[arg(long, default_value_t = 1)]
    pub nodes: usize,

    #[arg(long, default_value = "ubuntu-jammy")]
    pub pool_label: String,

    #[arg(long, default_value = "npool")]
    pub consumer_label: String,

    /// Have another session lock the last allocated node before accepting
    #[arg(long)]
    pub contend: bool,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct AcceptedNode {
    pub id: String,
    pub path: String,
    pub fence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_ip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub request_id: String,
    pub request_path: String,
    pub state: RequestState,
    pub allocated: Vec<String>,
    pub accepted: Vec<AcceptedNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cleanup_failures: Vec<String>,
    pub request_deleted: bool,
    pub released: usize,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request: {} ({})", self.request_id, self.state)?;
        writeln!(f, "  Path: {}", self.request_path)?;
        writeln!(f, "  Allocated: {}", self.allocated.join(", "))?;
        if !self.accepted.is_empty() {
            writeln!(f, "  Accepted:")?;
            for node in &self.accepted {
                writeln!(f, "    {} (fence {})", node.path, node.fence)?;
            }
        }
        if let Some(error) = &self.error {
            writeln!(f, "  Error: {}", error)?;
        }
        for failure in &self.cleanup_failures {
            writeln!(f, "  Cleanup: {}", failure)?;
        }
        writeln!(f, "  Request deleted: {}", self.request_deleted)?;
        write!(f, "  Released: {}", self.released)
    }
}

pub async fn handle(config: PoolConfig, args: SimulateArgs) -> anyhow::Result<()> {
    let report = run(config, &args).await?;
    output::print(&report, args.format)?;
    Ok(())
}

pub async fn run(config: PoolConfig, args: &SimulateArgs) -> anyhow::Result<SimulationReport> {
    let store = MemoryStore::new().with_session_timeout(config.session_timeout);
    let mut scheduler = Scheduler::new(store.clone(), &config);
    scheduler.provision(args.nodes, &args.pool_label)?;

    let session = store.session();
    let client = PoolClient::new(TracedStore::new(session.clone()), config)?;

    let request = client
        .request_node(&args.pool_label, &args.consumer_label)
        .await?;
    let changed = client.watch_request(&request).await?;
    scheduler.run_once(args.nodes)?;
    tracing::debug!(ready = scheduler.ready_count(&args.pool_label), "scheduler pass done");
    let event = changed.await?;
    tracing::debug!(path = event.path(), "request changed");

    let request = client.refresh_request(&request).await?;
    let request_path = request
        .path()
        .ok_or_else(|| anyhow!("refreshed request lost its path"))?
        .to_string();

    let mut report = SimulationReport {
        request_id: request.id().unwrap_or_default().to_string(),
        request_path: request_path.clone(),
        state: request.state(),
        allocated: request.allocated_nodes().to_vec(),
        accepted: Vec::new(),
        error: None,
        cleanup_failures: Vec::new(),
        request_deleted: false,
        released: 0,
    };

    if request.is_failed() {
        tracing::warn!(request = request_path.as_str(), "scheduler could not fill the request");
    }

    let rival = store.session();
    if args.contend {
        if let Some(last) = request.allocated_nodes().last() {
            let node_path = nodepool_core::path::join(client.node_root().as_str(), last);
            rival.acquire_lock(&node_path).await?;
            tracing::info!(node = node_path.as_str(), session = %rival.id(), "rival holds node");
        }
    }

    let outcome = client.accept_nodes(request).await;
    report.cleanup_failures = outcome
        .cleanup
        .failures()
        .iter()
        .map(ToString::to_string)
        .collect();

    match outcome.into_result() {
        Ok(nodes) => {
            for node in nodes {
                report.accepted.push(AcceptedNode {
                    id: node.node_id().to_string(),
                    path: node.path().to_string(),
                    fence: node.lock().fence(),
                    interface_ip: node.metadata().interface_ip.clone(),
                });
                client.release_node(node).await?;
                report.released += 1;
            }
        }
        Err(e) => report.error = Some(e.to_string()),
    }

    report.request_deleted = !client.node_exists(&request_path).await?;
    rival.close();
    session.close();
    Ok(report)
}

#[cfg(test)]
#[path = "simulate_tests.rs"]
mod tests;
