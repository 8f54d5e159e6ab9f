use loyalty_engine::{accrual::AccrualError, LedgerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An error occurred in the ledger. {0}")]
    LedgerError(#[from] LedgerError),
    #[error("An error occurred in the accrual poller. {0}")]
    AccrualError(#[from] AccrualError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
}
