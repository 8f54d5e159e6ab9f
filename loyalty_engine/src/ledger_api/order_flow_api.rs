//! Uploading orders and listing them.
use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::{
    cache::LedgerCache,
    db_types::{NewOrder, Order},
    helpers::parse_order_number,
    ledger_objects::OrderView,
    traits::LedgerStore,
    LedgerApiError,
};

pub struct OrderFlowApi<B> {
    cache: Arc<LedgerCache<B>>,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.cache)
    }
}

impl<B> OrderFlowApi<B>
where B: LedgerStore
{
    pub fn new(cache: Arc<LedgerCache<B>>) -> Self {
        Self { cache }
    }

    /// Registers an order number for the user. The order starts out `NEW` and is picked up by the accrual poller.
    ///
    /// Uploading the same number twice gives [`LedgerError::OrderAlreadyLoadedByUser`](crate::LedgerError), which
    /// callers usually treat as success. A number that someone else uploaded gives
    /// [`LedgerError::OrderAlreadyLoadedByAnotherUser`](crate::LedgerError).
    pub async fn post_order(&self, user_id: i64, number: &str) -> Result<Order, LedgerApiError> {
        let number = number.trim();
        let id = parse_order_number(number).ok_or_else(|| LedgerApiError::InvalidOrderNumber(number.to_string()))?;
        let order = self.cache.add_order(NewOrder::new(id, user_id)).await?;
        info!("📝️ User {user_id} uploaded order {id}");
        Ok(order)
    }

    /// Every order the user has uploaded, oldest first. A user without orders gets an empty list.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<OrderView>, LedgerApiError> {
        let orders = self.cache.orders_for_user(user_id).await?;
        trace!("📝️ User {user_id} has {} orders", orders.len());
        Ok(orders.into_iter().map(OrderView::from).collect())
    }
}
