use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order},
    traits::LedgerError,
};

/// Inserts the order with status `NEW`. If the id already exists, nothing is written and the error says who owns the
/// existing order.
///
/// The insert is the first statement, so inside a transaction this takes the write lock before the ownership check
/// reads anything.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    let inserted: Option<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (id, user_id, status, uploaded_at)
            VALUES ($1, $2, 'NEW', $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.uploaded_at)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(order) = inserted {
        debug!("📝️ Order {} inserted for user {}", order.id, order.user_id);
        return Ok(order);
    }
    let existing = fetch_order(order.id, conn)
        .await?
        .ok_or_else(|| LedgerError::DatabaseError(format!("Order {} conflicted but cannot be read", order.id)))?;
    trace!("📝️ Order {} already exists and belongs to user {}", existing.id, existing.user_id);
    if existing.user_id == order.user_id {
        Err(LedgerError::OrderAlreadyLoadedByUser(order.id))
    } else {
        Err(LedgerError::OrderAlreadyLoadedByAnotherUser(order.id))
    }
}

/// Writes the status and accrual of `order`, but only if the stored order is not yet final.
///
/// Returns `None` if no row was changed, either because the order does not exist or because it is final.
pub async fn update_pending_order(order: &Order, conn: &mut SqliteConnection) -> Result<Option<Order>, LedgerError> {
    let updated = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, accrual = $2
            WHERE id = $3 AND status IN ('NEW', 'PROCESSING')
            RETURNING *;
        "#,
    )
    .bind(order.status.as_str())
    .bind(order.accrual)
    .bind(order.id)
    .fetch_optional(conn)
    .await?;
    Ok(updated)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY uploaded_at ASC, id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_pending_orders(limit: u32, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE status IN ('NEW', 'PROCESSING')
            ORDER BY uploaded_at ASC, id ASC
            LIMIT $1;
        "#,
    )
    .bind(i64::from(limit))
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
