//! Balances and withdrawals.
use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::{
    cache::LedgerCache,
    db_types::{NewWithdrawal, Points, SortOrder, Withdrawal},
    helpers::parse_order_number,
    ledger_objects::{BalanceView, WithdrawRequest, WithdrawalView},
    traits::LedgerStore,
    LedgerApiError,
};

pub struct BalanceApi<B> {
    cache: Arc<LedgerCache<B>>,
    withdrawal_order: SortOrder,
}

impl<B: Debug> Debug for BalanceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BalanceApi ({:?}, {:?})", self.cache, self.withdrawal_order)
    }
}

impl<B> BalanceApi<B>
where B: LedgerStore
{
    pub fn new(cache: Arc<LedgerCache<B>>) -> Self {
        Self { cache, withdrawal_order: SortOrder::default() }
    }

    /// Sets the order in which [`BalanceApi::withdrawals`] lists withdrawals. Newest first by default.
    pub fn with_withdrawal_order(mut self, sort: SortOrder) -> Self {
        self.withdrawal_order = sort;
        self
    }

    pub async fn balance(&self, user_id: i64) -> Result<BalanceView, LedgerApiError> {
        let balance = self.cache.balance(user_id).await?;
        Ok(balance.into())
    }

    /// Spends `request.sum` points against the order number in `request.order`.
    pub async fn withdraw(&self, user_id: i64, request: WithdrawRequest) -> Result<Withdrawal, LedgerApiError> {
        let number = request.order.trim();
        let order_id =
            parse_order_number(number).ok_or_else(|| LedgerApiError::InvalidOrderNumber(number.to_string()))?;
        let sum = Points::from_decimal(request.sum).map_err(|e| LedgerApiError::InvalidAmount(e.to_string()))?;
        if !sum.is_positive() {
            return Err(LedgerApiError::InvalidAmount(format!("{} is not a positive amount", request.sum)));
        }
        let withdrawal = self.cache.withdraw(NewWithdrawal::new(order_id, user_id, sum)).await?;
        info!("💰️ User {user_id} withdrew {sum} against order {order_id}");
        Ok(withdrawal)
    }

    /// The user's withdrawals, or `None` if they have never made one.
    pub async fn withdrawals(&self, user_id: i64) -> Result<Option<Vec<WithdrawalView>>, LedgerApiError> {
        let withdrawals = self.cache.withdrawals_for_user(user_id, self.withdrawal_order).await?;
        if withdrawals.is_empty() {
            return Ok(None);
        }
        Ok(Some(withdrawals.into_iter().map(WithdrawalView::from).collect()))
    }
}
