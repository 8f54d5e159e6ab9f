use thiserror::Error;

use crate::traits::LedgerError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerApiError {
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("The session has expired")]
    SessionExpired,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
