use async_trait::async_trait;

use crate::{
    db_types::{NewOrder, Order},
    traits::LedgerError,
};

/// Storage of uploaded orders and the accrual updates applied to them.
#[async_trait]
pub trait OrderManagement: Send + Sync {
    /// Stores a new order with status `NEW`.
    ///
    /// The order id is the arbiter for duplicates. If the id is already taken, the error reports whether it was taken
    /// by the same user ([`LedgerError::OrderAlreadyLoadedByUser`]) or by someone else
    /// ([`LedgerError::OrderAlreadyLoadedByAnotherUser`]). Nothing is written in either case.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, LedgerError>;

    /// Applies the status and accrual of `order` to the stored order, in a single transaction.
    ///
    /// Only orders that are still `NEW` or `PROCESSING` can be updated; anything else fails with
    /// [`LedgerError::OrderFinalized`]. If the new status is `PROCESSED`, the accrual is credited to the owner's
    /// balance in the same transaction, so it is credited exactly once.
    ///
    /// Returns the order as stored.
    async fn update_order(&self, order: &Order) -> Result<Order, LedgerError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Order, LedgerError>;

    /// All orders uploaded by the user, oldest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError>;

    /// Up to `limit` orders that are still `NEW` or `PROCESSING`, oldest first.
    async fn fetch_pending_orders(&self, limit: u32) -> Result<Vec<Order>, LedgerError>;
}
