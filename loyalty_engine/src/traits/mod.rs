//! # Ledger storage contracts
//!
//! This module defines what a ledger backend must provide. The storage interface is split by entity so that each
//! component only depends on the part of the ledger it touches:
//!
//! * [`OrderManagement`] stores orders and applies accrual updates, crediting balances for processed orders.
//! * [`BalanceManagement`] reads balances.
//! * [`WithdrawalManagement`] debits balances and records withdrawals.
//! * [`UserManagement`] and [`SessionManagement`] look after the users that own everything else.
//!
//! [`LedgerStore`] bundles all of them and is what the cache and the accrual poller are generic over.
mod balance_management;
mod errors;
mod order_management;
mod session_management;
mod user_management;
mod withdrawal_management;

pub use balance_management::BalanceManagement;
pub use errors::LedgerError;
pub use order_management::OrderManagement;
pub use session_management::SessionManagement;
pub use user_management::UserManagement;
pub use withdrawal_management::WithdrawalManagement;

/// A complete ledger backend.
pub trait LedgerStore:
    OrderManagement + BalanceManagement + WithdrawalManagement + UserManagement + SessionManagement + Clone + 'static
{
    /// The connection URL of the backing store.
    fn url(&self) -> &str;
}
