use std::{collections::HashMap, sync::Arc, time::Duration};

use httpmock::prelude::*;
use loyalty_engine::{
    accrual::HttpAccrualClient,
    db_types::{NewOrder, NewUser, OrderStatusType, Points},
    test_utils::prepare_env::{new_test_database, tear_down},
    LedgerCache,
};
use loyalty_server::{accrual_worker::start_accrual_worker, config::ServerConfig};
use serde_json::json;

fn fast_config(address: &str) -> ServerConfig {
    let vars = HashMap::from([
        ("LPS_ACCRUAL_SYSTEM_ADDRESS", address.to_string()),
        ("LPS_ACCRUAL_REQUEST_TIMEOUT", "2".to_string()),
        ("LPS_POLL_TIME_UNIT_MS", "10".to_string()),
    ]);
    ServerConfig::from_source(|name| vars.get(name).cloned())
}

#[tokio::test]
async fn worker_settles_orders_from_the_accrual_service() {
    let server = MockServer::start_async().await;
    let processed = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(200).json_body(json!({"order": "12345678903", "status": "PROCESSED", "accrual": 729.98}));
        })
        .await;
    let invalid = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/2377225624");
            then.status(200).json_body(json!({"order": "2377225624", "status": "INVALID"}));
        })
        .await;

    let config = fast_config(&server.base_url());
    let db = new_test_database(5).await;
    let cache = Arc::new(LedgerCache::new(db.clone()));
    let user = cache.add_user(NewUser::new("alice", "hash")).await.expect("Error creating user");
    cache.add_order(NewOrder::new(12345678903, user.id)).await.expect("Error creating order");
    cache.add_order(NewOrder::new(2377225624, user.id)).await.expect("Error creating order");

    let client = HttpAccrualClient::new(&config.accrual.address, config.accrual.request_timeout).unwrap();
    let handle = start_accrual_worker(cache.clone(), Arc::new(client), &config.accrual);

    let mut settled = false;
    for _ in 0..200 {
        let orders = cache.orders_for_user(user.id).await.unwrap();
        if orders.iter().all(|o| o.status.is_final()) {
            settled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.stop(config.shutdown_timeout).await.expect("Worker did not stop cleanly");
    assert!(settled, "Orders were not settled in time");

    let first = cache.order(12345678903).await.unwrap();
    assert_eq!(first.status, OrderStatusType::Processed);
    assert_eq!(first.accrual, Some(Points::from(72998)));
    let second = cache.order(2377225624).await.unwrap();
    assert_eq!(second.status, OrderStatusType::Invalid);
    let balance = cache.balance(user.id).await.unwrap();
    assert_eq!(balance.current, Points::from(72998));
    // Final orders are never polled again
    assert_eq!(processed.hits_async().await, 1);
    assert_eq!(invalid.hits_async().await, 1);

    drop(cache);
    tear_down(db).await;
}

#[tokio::test]
async fn worker_stops_promptly_with_nothing_to_do() {
    let server = MockServer::start_async().await;
    let config = fast_config(&server.base_url());
    let db = new_test_database(2).await;
    let cache = Arc::new(LedgerCache::new(db.clone()));
    let client = HttpAccrualClient::new(&config.accrual.address, config.accrual.request_timeout).unwrap();
    let handle = start_accrual_worker(cache.clone(), Arc::new(client), &config.accrual);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    handle.stop(Duration::from_secs(2)).await.expect("Worker did not stop cleanly");
    drop(cache);
    tear_down(db).await;
}
