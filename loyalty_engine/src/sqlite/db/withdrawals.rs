use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewWithdrawal, SortOrder, Withdrawal},
    traits::LedgerError,
};

/// Records the withdrawal. The order id may only be used once across all users.
pub async fn insert_withdrawal(
    withdrawal: NewWithdrawal,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, LedgerError> {
    let inserted: Option<Withdrawal> = sqlx::query_as(
        r#"
            INSERT INTO withdrawals (order_id, user_id, sum, processed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(withdrawal.order_id)
    .bind(withdrawal.user_id)
    .bind(withdrawal.sum)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(w) = inserted {
        debug!("💰️ Withdrawal of {} against order {} recorded for user {}", w.sum, w.order_id, w.user_id);
        return Ok(w);
    }
    let existing = fetch_withdrawal(withdrawal.order_id, conn)
        .await?
        .ok_or_else(|| LedgerError::DatabaseError(format!("Withdrawal {} conflicted but cannot be read", withdrawal.order_id)))?;
    trace!("💰️ Order {} was already used for a withdrawal by user {}", existing.order_id, existing.user_id);
    if existing.user_id == withdrawal.user_id {
        Err(LedgerError::WithdrawalAlreadyRecordedByUser(withdrawal.order_id))
    } else {
        Err(LedgerError::WithdrawalAlreadyRecordedByAnotherUser(withdrawal.order_id))
    }
}

pub async fn fetch_withdrawal(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Withdrawal>, sqlx::Error> {
    let withdrawal =
        sqlx::query_as("SELECT * FROM withdrawals WHERE order_id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(withdrawal)
}

pub async fn fetch_withdrawals_for_user(
    user_id: i64,
    sort: SortOrder,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let direction = sort.sql_direction();
    let query = format!(
        "SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY processed_at {direction}, order_id {direction}"
    );
    let withdrawals = sqlx::query_as(&query).bind(user_id).fetch_all(conn).await?;
    Ok(withdrawals)
}
