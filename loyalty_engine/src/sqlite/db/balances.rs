use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Balance, Points},
    traits::LedgerError,
};

pub async fn insert_empty_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Balance, sqlx::Error> {
    let balance = sqlx::query_as("INSERT INTO balances (user_id, current, withdrawn) VALUES ($1, 0, 0) RETURNING *")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    Ok(balance)
}

pub async fn fetch_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Balance>, sqlx::Error> {
    let balance =
        sqlx::query_as("SELECT * FROM balances WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(balance)
}

/// Adds `amount` to the user's current balance.
pub async fn credit(user_id: i64, amount: Points, conn: &mut SqliteConnection) -> Result<Balance, LedgerError> {
    let balance: Option<Balance> =
        sqlx::query_as("UPDATE balances SET current = current + $1 WHERE user_id = $2 RETURNING *")
            .bind(amount)
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    let balance = balance.ok_or(LedgerError::BalanceNotFound(user_id))?;
    trace!("💰️ Credited {amount} to user {user_id}. Current balance: {}", balance.current);
    Ok(balance)
}

/// Moves `amount` from the user's current balance to their withdrawn total. The update is guarded on the current
/// balance covering the amount, so the check and the debit cannot be separated by a concurrent writer.
pub async fn debit(user_id: i64, amount: Points, conn: &mut SqliteConnection) -> Result<Balance, LedgerError> {
    let balance: Option<Balance> = sqlx::query_as(
        r#"
            UPDATE balances SET current = current - $1, withdrawn = withdrawn + $1
            WHERE user_id = $2 AND current >= $1
            RETURNING *;
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    match balance {
        Some(balance) => {
            trace!("💰️ Debited {amount} from user {user_id}. Current balance: {}", balance.current);
            Ok(balance)
        },
        None => match fetch_balance(user_id, conn).await? {
            Some(_) => Err(LedgerError::NotEnoughFunds),
            None => Err(LedgerError::BalanceNotFound(user_id)),
        },
    }
}
