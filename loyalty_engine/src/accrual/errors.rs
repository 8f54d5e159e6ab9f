use std::time::Duration;

use thiserror::Error;

use crate::traits::LedgerError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccrualError {
    #[error("Could not reach the accrual service. {0}")]
    Transport(String),
    #[error("The accrual service sent a response that could not be understood. {0}")]
    InvalidResponse(String),
    #[error("The accrual service reported an internal error")]
    ServerError,
    #[error("The accrual service is rate limiting requests")]
    TooManyRequests,
    #[error("The accrual service replied with unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("Could not update the ledger. {0}")]
    Ledger(#[from] LedgerError),
    #[error("A reconciliation task failed to complete. {0}")]
    TaskFailed(String),
    #[error("The poller did not stop within {0:?} and was aborted")]
    ShutdownTimedOut(Duration),
}
