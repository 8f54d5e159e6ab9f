use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Balance, Order, OrderStatusType, Withdrawal};

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub number: String,
    pub status: OrderStatusType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<f64>,
    pub uploaded_at: String,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            number: order.id.to_string(),
            status: order.status,
            accrual: order.accrual.map(|a| a.to_decimal()),
            uploaded_at: format_timestamp(&order.uploaded_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub current: f64,
    pub withdrawn: f64,
}

impl From<Balance> for BalanceView {
    fn from(balance: Balance) -> Self {
        Self { current: balance.current.to_decimal(), withdrawn: balance.withdrawn.to_decimal() }
    }
}

/// A request to spend points against a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: f64,
}

impl WithdrawRequest {
    pub fn new<S: Into<String>>(order: S, sum: f64) -> Self {
        Self { order: order.into(), sum }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalView {
    pub order: String,
    pub sum: f64,
    pub processed_at: String,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(w: Withdrawal) -> Self {
        Self { order: w.order_id.to_string(), sum: w.sum.to_decimal(), processed_at: format_timestamp(&w.processed_at) }
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::db_types::Points;

    #[test]
    fn order_view_json() {
        let uploaded_at = Utc.with_ymd_and_hms(2020, 12, 10, 15, 15, 45).unwrap();
        let order = Order {
            id: 9278923470,
            user_id: 1,
            status: OrderStatusType::Processed,
            accrual: Some(Points::from(50000)),
            uploaded_at,
        };
        let json = serde_json::to_value(OrderView::from(order.clone())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"number": "9278923470", "status": "PROCESSED", "accrual": 500.0, "uploaded_at": "2020-12-10T15:15:45+00:00"})
        );
        let pending = order.with_status(OrderStatusType::New, None);
        let json = serde_json::to_value(OrderView::from(pending)).unwrap();
        assert!(json.get("accrual").is_none());
        assert_eq!(json["status"], "NEW");
    }

    #[test]
    fn balance_view() {
        let view = BalanceView::from(Balance { user_id: 3, current: Points::from(50050), withdrawn: Points::from(4200) });
        assert_eq!(view, BalanceView { current: 500.5, withdrawn: 42.0 });
    }
}
