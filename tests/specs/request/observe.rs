//! Observing the scheduler's changes to a request

use crate::prelude::*;
use nodepool_store::WatchEvent;

#[tokio::test]
async fn watch_then_refresh_sees_allocation() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let node = pool.node("0000000001");
    let request = client.request_node(LABEL, "specs").await.unwrap();

    let changed = client.watch_request(&request).await.unwrap();
    pool.allocate(&request, &[node.clone()]);

    assert!(matches!(changed.await.unwrap(), WatchEvent::DataChanged(_)));
    let fresh = client.refresh_request(&request).await.unwrap();
    assert!(fresh.is_fulfilled());
    assert_eq!(fresh.allocated_nodes(), [node]);
}

#[tokio::test]
async fn watch_fires_once_on_deletion() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let request = client.request_node(LABEL, "specs").await.unwrap();

    let changed = client.watch_request(&request).await.unwrap();
    let report = client.delete_node(request.path().unwrap()).await;

    assert!(report.is_clean());
    assert_eq!(
        changed.await.unwrap(),
        WatchEvent::Deleted(request.path().unwrap().to_string())
    );
}

#[tokio::test]
async fn poll_loop_stops_on_scheduler_failure() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let request = client.request_node(LABEL, "specs").await.unwrap();
    let path = request.path().unwrap();
    let failed = request
        .clone()
        .with_state(nodepool_core::RequestState::Failed);
    pool.store.set_data(path, &failed.to_json().unwrap()).unwrap();

    let mut polls = 0;
    let fresh = loop {
        polls += 1;
        let fresh = client.refresh_request(&request).await.unwrap();
        if fresh.is_fulfilled() || fresh.is_failed() {
            break fresh;
        }
        assert!(polls < 3);
    };

    assert!(fresh.is_failed());
    assert!(fresh.allocated_nodes().is_empty());
}
