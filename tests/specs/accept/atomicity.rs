//! All-or-nothing acceptance

use crate::prelude::*;
use nodepool_client::{CleanupError, PoolError};
use nodepool_store::{CoordinationStore, StoreError, StoreOp};

#[tokio::test]
async fn second_lock_held_rolls_back_first_and_skips_third() {
    let pool = Pool::new();
    let (client, fake) = pool.client();
    let nodes: Vec<String> = ["0000000001", "0000000002", "0000000003"]
        .iter()
        .map(|id| pool.node(id))
        .collect();
    let other = pool.store.session();
    other.acquire_lock(&nodes[1]).await.unwrap();
    let request = pool.allocated_request(&client, &nodes).await;
    let request_path = request.path().unwrap().to_string();

    let outcome = client.accept_nodes(request).await;

    assert!(outcome.nodes().is_empty());
    assert!(matches!(outcome.result, Err(PoolError::LockUnavailable { .. })));
    similar_asserts::assert_eq!(fake.lock_attempts(), nodes[..2].to_vec());
    similar_asserts::assert_eq!(fake.lock_releases(), nodes[..1].to_vec());
    assert_eq!(pool.store.lock_holder(&nodes[0]), None);
    assert_eq!(pool.store.lock_holder(&nodes[1]), Some(other.id()));
    assert_eq!(pool.store.lock_holder(&nodes[2]), None);
    assert!(!pool.store.contains(&request_path));
}

#[tokio::test]
async fn both_lockable_nodes_are_returned_held() {
    let pool = Pool::new();
    let (client, fake) = pool.client();
    let nodes = vec![pool.node("0000000001"), pool.node("0000000002")];
    let request = pool.allocated_request(&client, &nodes).await;
    let request_path = request.path().unwrap().to_string();

    let outcome = client.accept_nodes(request).await;

    assert!(outcome.cleanup.is_clean());
    let handles = outcome.into_result().unwrap();
    let paths: Vec<&str> = handles.iter().map(|h| h.path()).collect();
    assert_eq!(paths, nodes.iter().map(String::as_str).collect::<Vec<_>>());
    for node in &nodes {
        assert_eq!(pool.store.lock_holder(node), Some(fake.session().id()));
    }
    assert!(!pool.store.contains(&request_path));
}

#[tokio::test]
async fn relative_allocations_resolve_under_node_root() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let absolute = pool.node("0000000009");
    let request = pool
        .allocated_request(&client, &["0000000009".to_string()])
        .await;

    let handles = client.accept_nodes(request).await.into_result().unwrap();

    assert_eq!(handles[0].path(), absolute);
    assert_eq!(handles[0].node_id(), "0000000009");
}

#[tokio::test]
async fn failed_release_is_reported_and_remaining_releases_proceed() {
    let pool = Pool::new();
    let (client, fake) = pool.client();
    let nodes: Vec<String> = ["0000000001", "0000000002", "0000000003"]
        .iter()
        .map(|id| pool.node(id))
        .collect();
    fake.fail(
        StoreOp::ReleaseLock,
        nodes[0].clone(),
        StoreError::Unavailable("connection loss".into()),
    );
    pool.store.session().acquire_lock(&nodes[2]).await.unwrap();
    let request = pool.allocated_request(&client, &nodes).await;

    let outcome = client.accept_nodes(request).await;

    assert!(!outcome.is_accepted());
    assert_eq!(pool.store.lock_holder(&nodes[1]), None);
    let failed: Vec<&str> = outcome.cleanup.failures().iter().map(CleanupError::path).collect();
    assert_eq!(failed, vec![nodes[0].as_str()]);
}

#[tokio::test]
async fn stale_copy_of_consumed_request_cannot_be_accepted_again() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let node = pool.node("0000000001");
    let request = pool.allocated_request(&client, &[node.clone()]).await;
    let stale = request.clone();

    let first = client.accept_nodes(request).await.into_result().unwrap();
    let second = client.accept_nodes(stale).await;

    assert_eq!(first.len(), 1);
    assert!(matches!(second.result, Err(PoolError::LockUnavailable { .. })));
    assert_eq!(pool.store.lock_holder(&node), Some(first[0].lock().holder()));
}

#[tokio::test]
async fn request_is_consumed_even_with_nothing_allocated() {
    let pool = Pool::new();
    let (client, fake) = pool.client();
    let request = client.request_node(LABEL, "specs").await.unwrap();
    let request_path = request.path().unwrap().to_string();

    let outcome = client.accept_nodes(request).await;

    assert!(matches!(outcome.result, Err(PoolError::NotAllocated { .. })));
    assert!(fake.lock_attempts().is_empty());
    assert!(!pool.store.contains(&request_path));
}
