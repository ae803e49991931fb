//! Untyped reads, existence probes and best-effort deletes

use crate::prelude::*;
use serde_json::json;

#[tokio::test]
async fn get_znode_returns_decoded_object() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    pool.store.put("/nodepool/config", br#"{"a":1}"#).unwrap();

    let map = client.get_znode("/nodepool/config").await.unwrap();

    assert_eq!(map.len(), 1);
    assert_eq!(map["a"], json!(1));
}

#[tokio::test]
async fn get_znode_on_missing_path_fails() {
    let pool = Pool::new();
    let (client, _) = pool.client();

    let err = client.get_znode("/nodepool/absent").await.unwrap_err();

    assert!(err.is_no_node());
}

#[tokio::test]
async fn deleting_missing_path_succeeds_without_touching_others() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let node = pool.node("0000000001");
    let request = client.request_node(LABEL, "specs").await.unwrap();

    let report = client.delete_node("/nodepool/requests/100-0000009999").await;

    assert!(report.is_clean());
    assert!(pool.store.contains(&node));
    assert!(pool.store.contains(request.path().unwrap()));
}

#[tokio::test]
async fn delete_twice_is_clean_both_times() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let request = client.request_node(LABEL, "specs").await.unwrap();
    let path = request.path().unwrap();

    assert!(client.delete_node(path).await.is_clean());
    assert!(client.delete_node(path).await.is_clean());
    assert!(!client.node_exists(path).await.unwrap());
}

#[tokio::test]
async fn reads_have_no_side_effects() {
    let pool = Pool::new();
    let (client, _) = pool.client();
    let node = pool.node("0000000001");
    let before = pool.store.get(&node);

    client.get_znode(&node).await.unwrap();
    client.node_exists(&node).await.unwrap();

    assert_eq!(pool.store.get(&node), before);
    assert_eq!(pool.store.lock_holder(&node), None);
}
