use async_trait::async_trait;

use crate::{
    db_types::{NewUser, User},
    traits::LedgerError,
};

#[async_trait]
pub trait UserManagement: Send + Sync {
    /// Creates the user together with an empty balance.
    async fn insert_user(&self, user: NewUser) -> Result<User, LedgerError>;

    async fn fetch_user(&self, user_id: i64) -> Result<User, LedgerError>;

    async fn fetch_user_by_login(&self, login: &str) -> Result<User, LedgerError>;
}
