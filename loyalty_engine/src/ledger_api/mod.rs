//! # Loyalty engine public API
//!
//! The caller-facing operations of the ledger. The APIs speak the caller's language: order numbers are strings,
//! amounts are decimal points and timestamps are RFC 3339. Internally everything is converted to integer ids and
//! [`crate::db_types::Points`] before it reaches the cache.
//!
//! * [`order_flow_api`] uploads orders and lists a user's orders.
//! * [`balance_api`] reports balances and handles withdrawals.
//! * [`auth_api`] registers users and manages their sessions.
//!
//! Every API is created from a shared [`LedgerCache`](crate::LedgerCache), so they all see the same cached state as
//! the accrual poller:
//!
//! ```rust,ignore
//! let db = SqliteDatabase::new_with_url("sqlite://data/loyalty.db", 25).await?;
//! let cache = Arc::new(LedgerCache::new(db));
//! let orders = OrderFlowApi::new(Arc::clone(&cache));
//! let order = orders.post_order(user.id, "12345678903").await?;
//! ```
pub mod auth_api;
pub mod balance_api;
pub mod errors;
pub mod ledger_objects;
pub mod order_flow_api;
