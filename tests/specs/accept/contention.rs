//! Two consumers allocated the same node

use crate::prelude::*;
use nodepool_client::PoolError;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exactly_one_caller_wins_a_contended_node() {
    let pool = Pool::new();
    let node = pool.node("0000000001");
    let (alice, _) = pool.client();
    let (bob, _) = pool.client();
    let a = pool.allocated_request(&alice, &[node.clone()]).await;
    let b = pool.allocated_request(&bob, &[node.clone()]).await;

    let (left, right) = tokio::join!(
        tokio::spawn({
            let alice = alice.clone();
            async move { alice.accept_nodes(a).await.into_result() }
        }),
        tokio::spawn({
            let bob = bob.clone();
            async move { bob.accept_nodes(b).await.into_result() }
        }),
    );
    let results = [left.unwrap(), right.unwrap()];

    let won: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(won.len(), 1);
    let lost = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(lost, Err(PoolError::LockUnavailable { path, .. }) if path == &node));
}

#[tokio::test]
async fn released_node_can_be_accepted_by_the_next_consumer() {
    let pool = Pool::new();
    let node = pool.node("0000000001");
    let (first, _) = pool.client();
    let (second, second_store) = pool.client();

    let request = pool.allocated_request(&first, &[node.clone()]).await;
    let mut held = first.accept_nodes(request).await.into_result().unwrap();
    first.release_node(held.remove(0)).await.unwrap();

    let request = pool.allocated_request(&second, &[node.clone()]).await;
    let handles = second.accept_nodes(request).await.into_result().unwrap();

    assert_eq!(handles.len(), 1);
    assert_eq!(pool.store.lock_holder(&node), Some(second_store.session().id()));
}
