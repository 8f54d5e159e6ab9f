use async_trait::async_trait;

use crate::{
    db_types::{NewWithdrawal, SortOrder, Withdrawal},
    traits::LedgerError,
};

#[async_trait]
pub trait WithdrawalManagement: Send + Sync {
    /// Debits the user's balance and records the withdrawal, atomically.
    ///
    /// Fails with [`LedgerError::NotEnoughFunds`] if the current balance does not cover the sum. A withdrawal against
    /// an order number that has already been used fails with [`LedgerError::WithdrawalAlreadyRecordedByUser`] or
    /// [`LedgerError::WithdrawalAlreadyRecordedByAnotherUser`]. In every failure case the balance is left untouched.
    async fn withdraw(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError>;

    async fn fetch_withdrawals_for_user(
        &self,
        user_id: i64,
        sort: SortOrder,
    ) -> Result<Vec<Withdrawal>, LedgerError>;
}
