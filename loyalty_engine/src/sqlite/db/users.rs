use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User},
    traits::LedgerError,
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, LedgerError> {
    let result: Result<User, sqlx::Error> =
        sqlx::query_as("INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING *")
            .bind(user.login.as_str())
            .bind(user.password_hash.as_str())
            .fetch_one(conn)
            .await;
    match result {
        Ok(u) => {
            debug!("👤️ User {} created with id {}", u.login, u.id);
            Ok(u)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(LedgerError::LoginAlreadyTaken(user.login)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_login(login: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE login = $1").bind(login).fetch_optional(conn).await?;
    Ok(user)
}
