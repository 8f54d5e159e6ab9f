use sqlx::SqliteConnection;

use crate::db_types::Session;

pub async fn insert_session(session: Session, conn: &mut SqliteConnection) -> Result<Session, sqlx::Error> {
    let session = sqlx::query_as("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3) RETURNING *")
        .bind(session.token)
        .bind(session.user_id)
        .bind(session.expires_at)
        .fetch_one(conn)
        .await?;
    Ok(session)
}

pub async fn fetch_session(token: &str, conn: &mut SqliteConnection) -> Result<Option<Session>, sqlx::Error> {
    let session = sqlx::query_as("SELECT * FROM sessions WHERE token = $1").bind(token).fetch_optional(conn).await?;
    Ok(session)
}

/// Returns the number of sessions removed.
pub async fn delete_session(token: &str, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = $1").bind(token).execute(conn).await?;
    Ok(result.rows_affected())
}
