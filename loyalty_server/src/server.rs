use std::{future::Future, io, sync::Arc};

use log::*;
use loyalty_engine::{accrual::HttpAccrualClient, LedgerCache, SqliteDatabase};

use crate::{accrual_worker::start_accrual_worker, config::ServerConfig, errors::ServerError};

/// Opens the ledger, starts the accrual worker and runs until the process receives Ctrl-C.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.migrate().await?;
    } else {
        info!("🗃️ Skipping database migrations");
    }
    run_until(&config, db, tokio::signal::ctrl_c()).await
}

/// Runs the accrual worker against `db` until `shutdown` resolves, then stops the worker and closes the database.
///
/// The worker is stopped and the database closed even if `shutdown` resolves to an error. That error takes precedence
/// over any error from stopping the worker.
pub async fn run_until<F>(config: &ServerConfig, mut db: SqliteDatabase, shutdown: F) -> Result<(), ServerError>
where F: Future<Output = io::Result<()>> {
    let result = run_worker(config, &db, shutdown).await;
    db.close().await?;
    result
}

async fn run_worker<F>(config: &ServerConfig, db: &SqliteDatabase, shutdown: F) -> Result<(), ServerError>
where F: Future<Output = io::Result<()>> {
    let client = HttpAccrualClient::new(&config.accrual.address, config.accrual.request_timeout)?;
    let cache = Arc::new(LedgerCache::new(db.clone()));
    let handle = start_accrual_worker(cache, Arc::new(client), &config.accrual);

    let signal = shutdown.await;
    match &signal {
        Ok(()) => info!("🚀️ Shutdown requested"),
        Err(e) => error!("🚀️ Could not wait for the shutdown signal. {e}. Shutting down."),
    }
    info!("🚀️ Waiting up to {}s for the accrual worker", config.shutdown_timeout.as_secs());
    let stopped = handle.stop(config.shutdown_timeout).await;
    signal?;
    stopped?;
    Ok(())
}
