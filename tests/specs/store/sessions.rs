//! Session loss frees everything the session owned

use crate::prelude::*;
use nodepool_client::PoolClient;
use nodepool_core::{FakeClock, PoolConfig};
use nodepool_store::{CoordinationStore, MemoryStore, TracedStore};
use std::time::Duration;

#[tokio::test]
async fn closed_session_drops_requests_and_locks() {
    let pool = Pool::new();
    let (client, fake) = pool.client();
    let node = pool.node("0000000001");
    let pending = client.request_node(LABEL, "specs").await.unwrap();
    let request = pool.allocated_request(&client, &[node.clone()]).await;
    let _held = client.accept_nodes(request).await.into_result().unwrap();

    fake.session().close();

    assert!(!pool.store.contains(pending.path().unwrap()));
    assert_eq!(pool.store.lock_holder(&node), None);
    assert!(pool.store.contains(&node));
}

#[tokio::test]
async fn silent_session_expires_and_frees_its_node() {
    let clock = FakeClock::new();
    let store = MemoryStore::with_clock(clock.clone()).with_session_timeout(Duration::from_secs(10));
    store.put("/nodepool/nodes/0000000001", br#"{"label":"small"}"#).unwrap();
    let stalled = store.session();
    let alive = store.session();
    stalled.acquire_lock("/nodepool/nodes/0000000001").await.unwrap();

    clock.advance(Duration::from_secs(6));
    alive.heartbeat().unwrap();
    clock.advance(Duration::from_secs(6));
    let expired = store.expire_stale_sessions();

    assert_eq!(expired, vec![stalled.id()]);
    assert!(alive.acquire_lock("/nodepool/nodes/0000000001").await.is_ok());
}

#[tokio::test]
async fn traced_client_behaves_like_plain_client() {
    let store = MemoryStore::new();
    let client = PoolClient::new(TracedStore::new(store.session()), PoolConfig::default()).unwrap();

    let request = client.request_node(LABEL, "specs").await.unwrap();

    assert!(client.node_exists(request.path().unwrap()).await.unwrap());
    assert_eq!(
        client.store().session_id(),
        client.store().inner().id()
    );
}
