use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {0} has already been uploaded by this user")]
    OrderAlreadyLoadedByUser(i64),
    #[error("Order {0} has already been uploaded by another user")]
    OrderAlreadyLoadedByAnotherUser(i64),
    #[error("Order {0} has reached a final status and cannot be modified")]
    OrderFinalized(i64),
    #[error("There is no balance for user {0}")]
    BalanceNotFound(i64),
    #[error("Not enough funds on the account")]
    NotEnoughFunds,
    #[error("A withdrawal against order {0} has already been recorded by this user")]
    WithdrawalAlreadyRecordedByUser(i64),
    #[error("A withdrawal against order {0} has already been recorded by another user")]
    WithdrawalAlreadyRecordedByAnotherUser(i64),
    #[error("User {0} does not exist")]
    UserNotFound(String),
    #[error("The login {0} is already taken")]
    LoginAlreadyTaken(String),
    #[error("The session does not exist")]
    SessionNotFound,
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for LedgerError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        LedgerError::DatabaseError(format!("Migration failed. {e}"))
    }
}
