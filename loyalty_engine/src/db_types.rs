use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
pub use lp_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------     OrderStatusType       ---------------------------------------------------
#[derive(Debug, Clone, Copy, Type, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been uploaded but the accrual service has not reported on it yet.
    New,
    /// The accrual service knows about the order and is still calculating the reward.
    Processing,
    /// The reward has been calculated and credited. Terminal.
    Processed,
    /// The accrual service rejected the order. Terminal.
    Invalid,
}

impl OrderStatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::New => "NEW",
            OrderStatusType::Processing => "PROCESSING",
            OrderStatusType::Processed => "PROCESSED",
            OrderStatusType::Invalid => "INVALID",
        }
    }

    /// Once an order is final, neither its status nor its accrual may change again.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatusType::Processed | OrderStatusType::Invalid)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "PROCESSED" => Ok(Self::Processed),
            "INVALID" => Ok(Self::Invalid),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        Orders         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatusType,
    pub accrual: Option<Points>,
    pub uploaded_at: DateTime<Utc>,
}

impl Order {
    /// A copy of this order carrying a new status and accrual, ready to be passed to `update_order`.
    pub fn with_status(&self, status: OrderStatusType, accrual: Option<Points>) -> Self {
        Self { status, accrual, ..self.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: i64,
    pub user_id: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(id: i64, user_id: i64) -> Self {
        Self { id, user_id, uploaded_at: Utc::now() }
    }

    pub fn uploaded_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.uploaded_at = timestamp;
        self
    }
}

//--------------------------------------       Balances        -------------------------------------------------------
#[derive(Debug, Clone, Copy, FromRow, PartialEq, Eq)]
pub struct Balance {
    pub user_id: i64,
    pub current: Points,
    pub withdrawn: Points,
}

//--------------------------------------      Withdrawals      -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub order_id: i64,
    pub user_id: i64,
    pub sum: Points,
}

impl NewWithdrawal {
    pub fn new(order_id: i64, user_id: i64, sum: Points) -> Self {
        Self { order_id, user_id, sum }
    }
}

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Withdrawal {
    pub order_id: i64,
    pub user_id: i64,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    OldestFirst,
    #[default]
    NewestFirst,
}

impl SortOrder {
    pub(crate) fn sql_direction(&self) -> &'static str {
        match self {
            SortOrder::OldestFirst => "ASC",
            SortOrder::NewestFirst => "DESC",
        }
    }
}

//--------------------------------------     Users & Sessions    -----------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    /// Already hashed by the caller. The ledger never sees a plaintext password.
    pub password_hash: String,
}

impl NewUser {
    pub fn new<S1: Into<String>, S2: Into<String>>(login: S1, password_hash: S2) -> Self {
        Self { login: login.into(), password_hash: password_hash.into() }
    }
}

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session with a fresh random 128-bit token.
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let token = format!("{:032x}", rand::random::<u128>());
        Self { token, user_id, expires_at: Utc::now() + ttl }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
