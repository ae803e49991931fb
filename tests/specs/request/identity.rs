//! Request placement and identity

use crate::prelude::*;
use nodepool_client::PoolError;
use nodepool_core::{id_for_path, PoolConfig, RequestState};
use std::collections::HashSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_yield_distinct_suffix_identities() {
    let pool = Pool::new();
    let (client, _) = pool.client();

    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.request_node(LABEL, &format!("job-{}", i)).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        let request = task.await.unwrap().unwrap();
        let path = request.path().unwrap();
        assert_eq!(id_for_path(path).unwrap(), request.id().unwrap());
        assert!(pool.store.contains(path));
        ids.insert(request.id().unwrap().to_string());
    }
    assert_eq!(ids.len(), 50);
}

#[tokio::test]
async fn sequence_is_ten_digits_under_priority_prefix() {
    let pool = Pool::with_config(PoolConfig::default().with_priority(7));
    let (client, _) = pool.client();

    let first = client.request_node(LABEL, "a").await.unwrap();
    let second = client.request_node(LABEL, "b").await.unwrap();

    assert_eq!(first.path(), Some("/nodepool/requests/7-0000000000"));
    assert_eq!(second.path(), Some("/nodepool/requests/7-0000000001"));
    assert_eq!(second.state(), RequestState::Requested);
}

#[tokio::test]
async fn stored_record_uses_wire_field_names() {
    let pool = Pool::new();
    let (client, _) = pool.client();

    let request = client.request_node(LABEL, "specs").await.unwrap();

    let record = client.get_znode(request.path().unwrap()).await.unwrap();
    let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
    keys.sort_unstable();
    similar_asserts::assert_eq!(
        keys,
        vec!["allocatedNodes", "consumerLabel", "nodePoolID", "poolLabel", "state"]
    );
    assert_eq!(record["state"], "requested");
}

#[test]
fn identity_is_text_after_last_separator() {
    assert_eq!(id_for_path("/nodepool/requests/100-0000000042").unwrap(), "0000000042");
    assert_eq!(id_for_path("prefix-suffix").unwrap(), "suffix");
    assert!(id_for_path("/nodepool/requests/unsequenced").is_err());
}

#[tokio::test]
async fn invalid_config_never_reaches_the_store() {
    let pool = Pool::new();
    let fake = nodepool_store::FakeStore::new(&pool.store);

    let result = nodepool_client::PoolClient::new(
        fake.clone(),
        PoolConfig::default().with_namespace("/nodepool/"),
    );

    assert!(matches!(result, Err(PoolError::Config(_))));
    assert!(fake.calls().is_empty());
}
