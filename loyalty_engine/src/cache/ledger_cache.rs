use std::fmt::Debug;

use log::*;

use super::entity_cache::EntityCache;
use crate::{
    db_types::{Balance, NewOrder, NewUser, NewWithdrawal, Order, OrderStatusType, Session, SortOrder, User, Withdrawal},
    traits::{LedgerError, LedgerStore},
};

/// `LedgerCache` fronts a [`LedgerStore`] with per-entity read-through caches.
///
/// Writes always go to the store first. Only once the store has committed does the cache record the result, or
/// drop the entries the write made stale. Reads may briefly observe a stale balance if they race a write; callers that
/// need the committed value use [`LedgerCache::fresh_balance`].
pub struct LedgerCache<B> {
    db: B,
    users: EntityCache<i64, User>,
    sessions: EntityCache<String, Session>,
    orders: EntityCache<i64, Order>,
    balances: EntityCache<i64, Balance>,
}

impl<B: Debug> Debug for LedgerCache<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerCache ({:?})", self.db)
    }
}

impl<B> LedgerCache<B>
where B: LedgerStore
{
    pub fn new(db: B) -> Self {
        Self {
            db,
            users: EntityCache::new("user"),
            sessions: EntityCache::new("session"),
            orders: EntityCache::new("order"),
            balances: EntityCache::new("balance"),
        }
    }

    /// The backing store. Writes made directly against it bypass the cache and will not be reflected here.
    pub fn db(&self) -> &B {
        &self.db
    }

    //--------------------------------------        Orders         ----------------------------------------------------
    pub async fn order(&self, order_id: i64) -> Result<Order, LedgerError> {
        self.orders.get_or_load(order_id, || self.db.fetch_order(order_id)).await
    }

    pub async fn add_order(&self, order: NewOrder) -> Result<Order, LedgerError> {
        let order = self.db.insert_order(order).await?;
        self.orders.put(order.id, order.clone());
        Ok(order)
    }

    /// Applies an accrual update. If the order was credited, the owner's cached balance is dropped.
    pub async fn update_order(&self, order: &Order) -> Result<Order, LedgerError> {
        match self.db.update_order(order).await {
            Ok(updated) => {
                self.orders.put(updated.id, updated.clone());
                if updated.status == OrderStatusType::Processed {
                    self.balances.invalidate(&updated.user_id);
                }
                Ok(updated)
            },
            Err(e) => {
                // Whatever we held for this order disagrees with the store
                if matches!(e, LedgerError::OrderFinalized(_) | LedgerError::OrderNotFound(_)) {
                    self.orders.invalidate(&order.id);
                }
                Err(e)
            },
        }
    }

    /// Always reads the store, and refreshes the cached copy of every order returned.
    pub async fn pending_orders(&self, limit: u32) -> Result<Vec<Order>, LedgerError> {
        let orders = self.db.fetch_pending_orders(limit).await?;
        for order in &orders {
            self.orders.put(order.id, order.clone());
        }
        trace!("🗂️ Refreshed {} pending orders", orders.len());
        Ok(orders)
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    //--------------------------------------       Balances        ----------------------------------------------------
    pub async fn balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        self.balances.get_or_load(user_id, || self.db.fetch_balance(user_id)).await
    }

    /// Reads the balance from the store, bypassing (and refreshing) the cache.
    pub async fn fresh_balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        let balance = self.db.fetch_balance(user_id).await?;
        self.balances.put(user_id, balance);
        Ok(balance)
    }

    /// Debits the balance and records the withdrawal. The cached balance is dropped whatever the outcome, so the next
    /// read reflects the store.
    pub async fn withdraw(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError> {
        let user_id = withdrawal.user_id;
        let result = self.db.withdraw(withdrawal).await;
        self.balances.invalidate(&user_id);
        result
    }

    pub async fn withdrawals_for_user(&self, user_id: i64, sort: SortOrder) -> Result<Vec<Withdrawal>, LedgerError> {
        self.db.fetch_withdrawals_for_user(user_id, sort).await
    }

    //--------------------------------------         Users         ----------------------------------------------------
    pub async fn add_user(&self, user: NewUser) -> Result<User, LedgerError> {
        let user = self.db.insert_user(user).await?;
        self.users.put(user.id, user.clone());
        Ok(user)
    }

    pub async fn user(&self, user_id: i64) -> Result<User, LedgerError> {
        self.users.get_or_load(user_id, || self.db.fetch_user(user_id)).await
    }

    pub async fn user_by_login(&self, login: &str) -> Result<User, LedgerError> {
        let epoch = self.users.epoch();
        let user = self.db.fetch_user_by_login(login).await?;
        self.users.fill(user.id, user.clone(), epoch);
        Ok(user)
    }

    //--------------------------------------       Sessions        ----------------------------------------------------
    pub async fn add_session(&self, session: Session) -> Result<Session, LedgerError> {
        let session = self.db.insert_session(session).await?;
        self.sessions.put(session.token.clone(), session.clone());
        Ok(session)
    }

    pub async fn session(&self, token: &str) -> Result<Session, LedgerError> {
        self.sessions.get_or_load(token.to_string(), || self.db.fetch_session(token)).await
    }

    pub async fn remove_session(&self, token: &str) -> Result<(), LedgerError> {
        self.db.delete_session(token).await?;
        self.sessions.invalidate(&token.to_string());
        Ok(())
    }
}
