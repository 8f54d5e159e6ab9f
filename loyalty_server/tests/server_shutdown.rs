use std::{collections::HashMap, io, time::Duration};

use httpmock::prelude::*;
use loyalty_engine::test_utils::prepare_env::{new_test_database, tear_down};
use loyalty_server::{config::ServerConfig, errors::ServerError, server::run_until};

fn test_config(address: &str) -> ServerConfig {
    let vars = HashMap::from([
        ("LPS_ACCRUAL_SYSTEM_ADDRESS", address.to_string()),
        ("LPS_POLL_TIME_UNIT_MS", "10".to_string()),
        ("LPS_SHUTDOWN_TIMEOUT", "2".to_string()),
    ]);
    ServerConfig::from_source(|name| vars.get(name).cloned())
}

#[tokio::test]
async fn clean_shutdown_closes_the_database() {
    let server = MockServer::start_async().await;
    let config = test_config(&server.base_url());
    let db = new_test_database(2).await;
    let shutdown = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    };
    run_until(&config, db.clone(), shutdown).await.expect("Server did not shut down cleanly");
    assert!(db.pool().is_closed());
    tear_down(db).await;
}

#[tokio::test]
async fn failed_shutdown_signal_still_stops_and_closes() {
    let server = MockServer::start_async().await;
    let config = test_config(&server.base_url());
    let db = new_test_database(2).await;
    let shutdown = async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) };
    let err = run_until(&config, db.clone(), shutdown).await.unwrap_err();
    assert!(matches!(err, ServerError::IOError(_)), "Unexpected error: {err}");
    assert!(db.pool().is_closed());
    tear_down(db).await;
}
