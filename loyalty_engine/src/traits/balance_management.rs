use async_trait::async_trait;

use crate::{db_types::Balance, traits::LedgerError};

#[async_trait]
pub trait BalanceManagement: Send + Sync {
    /// Fetches the balance of the given user. Every user has exactly one balance, created along with the user, so a
    /// missing balance is reported as [`LedgerError::BalanceNotFound`].
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, LedgerError>;
}
