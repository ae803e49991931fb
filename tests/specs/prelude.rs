//! Shared harness: one memory store standing in for the coordination
//! service, with helpers that play the pool scheduler's part.

#![allow(dead_code)]

use nodepool_client::PoolClient;
use nodepool_core::{NodeMetadata, NodeRequest, PoolConfig, RequestState};
use nodepool_store::{FakeStore, MemoryStore};

pub const LABEL: &str = "ubuntu-jammy";

pub struct Pool {
    pub store: MemoryStore,
    pub config: PoolConfig,
}

impl Pool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            store: MemoryStore::new(),
            config,
        }
    }

    /// A client on its own recording session
    pub fn client(&self) -> (PoolClient<FakeStore>, FakeStore) {
        let fake = FakeStore::new(&self.store);
        let client = PoolClient::new(fake.clone(), self.config.clone()).unwrap();
        (client, fake)
    }

    /// Write a ready node and return its absolute path
    pub fn node(&self, id: &str) -> String {
        let path = format!("{}/{}", self.config.node_path(), id);
        let metadata = NodeMetadata::new()
            .with_label(LABEL)
            .with_state("ready");
        self.store.put(&path, &metadata.to_json().unwrap()).unwrap();
        path
    }

    /// Allocate `nodes` to `request` as the scheduler would
    pub fn allocate(&self, request: &NodeRequest, nodes: &[String]) {
        let path = request.path().unwrap();
        let current = NodeRequest::from_json(path, &self.store.get(path).unwrap()).unwrap();
        let updated = current
            .with_allocated_nodes(nodes.to_vec())
            .with_state(RequestState::Fulfilled);
        self.store.set_data(path, &updated.to_json().unwrap()).unwrap();
    }

    /// Place a request through `client` and allocate `nodes` to it
    pub async fn allocated_request(
        &self,
        client: &PoolClient<FakeStore>,
        nodes: &[String],
    ) -> NodeRequest {
        let request = client.request_node(LABEL, "specs").await.unwrap();
        self.allocate(&request, nodes);
        client.refresh_request(&request).await.unwrap()
    }
}
