//! `SqliteDatabase` is the SQLite implementation of the loyalty ledger backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module. Each mutating method runs in its own
//! transaction; dropping the transaction on an early return rolls back anything already written.
use std::fmt::Debug;

use async_trait::async_trait;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{balances, new_pool, orders, sessions, users, withdrawals};
use crate::{
    db_types::{Balance, NewOrder, NewUser, NewWithdrawal, Order, OrderStatusType, Session, SortOrder, User, Withdrawal},
    traits::{
        BalanceManagement,
        LedgerError,
        LedgerStore,
        OrderManagement,
        SessionManagement,
        UserManagement,
        WithdrawalManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, creating the database file if it does not exist.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, LedgerError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date using the migrations embedded in the binary.
    pub async fn migrate(&self) -> Result<(), LedgerError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl LedgerStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn update_order(&self, order: &Order) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let updated = match orders::update_pending_order(order, &mut tx).await? {
            Some(updated) => updated,
            None => {
                return match orders::fetch_order(order.id, &mut tx).await? {
                    Some(_) => Err(LedgerError::OrderFinalized(order.id)),
                    None => Err(LedgerError::OrderNotFound(order.id)),
                };
            },
        };
        if updated.status == OrderStatusType::Processed {
            let accrual = updated.accrual.unwrap_or_default();
            balances::credit(updated.user_id, accrual, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("📝️ Order {} is now {}", updated.id, updated.status);
        Ok(updated)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(order_id, &mut conn).await?.ok_or(LedgerError::OrderNotFound(order_id))
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_pending_orders(&self, limit: u32) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_pending_orders(limit, &mut conn).await?;
        Ok(orders)
    }
}

#[async_trait]
impl BalanceManagement for SqliteDatabase {
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        balances::fetch_balance(user_id, &mut conn).await?.ok_or(LedgerError::BalanceNotFound(user_id))
    }
}

#[async_trait]
impl WithdrawalManagement for SqliteDatabase {
    /// The debit goes first so that the transaction holds the write lock from its first statement. If the order id
    /// turns out to be taken, dropping the transaction undoes the debit.
    async fn withdraw(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError> {
        let mut tx = self.pool.begin().await?;
        balances::debit(withdrawal.user_id, withdrawal.sum, &mut tx).await?;
        let withdrawal = withdrawals::insert_withdrawal(withdrawal, &mut tx).await?;
        tx.commit().await?;
        Ok(withdrawal)
    }

    async fn fetch_withdrawals_for_user(
        &self,
        user_id: i64,
        sort: SortOrder,
    ) -> Result<Vec<Withdrawal>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawals = withdrawals::fetch_withdrawals_for_user(user_id, sort, &mut conn).await?;
        Ok(withdrawals)
    }
}

#[async_trait]
impl UserManagement for SqliteDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<User, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(user, &mut tx).await?;
        balances::insert_empty_balance(user.id, &mut tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn fetch_user(&self, user_id: i64) -> Result<User, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user(user_id, &mut conn).await?.ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))
    }

    async fn fetch_user_by_login(&self, login: &str) -> Result<User, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_login(login, &mut conn).await?.ok_or_else(|| LedgerError::UserNotFound(login.to_string()))
    }
}

#[async_trait]
impl SessionManagement for SqliteDatabase {
    async fn insert_session(&self, session: Session) -> Result<Session, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let session = sessions::insert_session(session, &mut tx).await?;
        tx.commit().await?;
        Ok(session)
    }

    async fn fetch_session(&self, token: &str) -> Result<Session, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        sessions::fetch_session(token, &mut conn).await?.ok_or(LedgerError::SessionNotFound)
    }

    async fn delete_session(&self, token: &str) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let removed = sessions::delete_session(token, &mut conn).await?;
        trace!("👤️ {removed} session(s) removed");
        Ok(())
    }
}
