//! Loyalty Engine
//!
//! The loyalty engine keeps the points ledger for the loyalty service. Users upload order numbers, an external accrual
//! service decides how many points each order earns, and users spend the points they have accumulated against new
//! orders.
//!
//! The library is divided into the following sections:
//! 1. Ledger storage ([`traits`] and [`SqliteDatabase`]). The traits describe what a backend must provide; the SQLite
//!    implementation is the only one shipped. Every mutating operation is a single transaction.
//! 2. The coherence cache ([`LedgerCache`]). It sits in front of the store and is the only way the rest of the engine
//!    reaches it.
//! 3. Accrual reconciliation ([`mod@accrual`]). A background poller that asks the accrual service about pending orders
//!    and settles them in the ledger, backing off when the service pushes back.
//! 4. The public ledger API ([`OrderFlowApi`], [`BalanceApi`], [`AuthApi`]). These convert between the decimal and
//!    string representations used by callers and the integer representations used in the ledger.
pub mod accrual;
pub mod cache;
pub mod db_types;
pub mod helpers;
mod ledger_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use cache::LedgerCache;
pub use ledger_api::{
    auth_api::AuthApi,
    balance_api::BalanceApi,
    errors::LedgerApiError,
    ledger_objects,
    order_flow_api::OrderFlowApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    BalanceManagement,
    LedgerError,
    LedgerStore,
    OrderManagement,
    SessionManagement,
    UserManagement,
    WithdrawalManagement,
};
