use async_trait::async_trait;

use crate::{db_types::Session, traits::LedgerError};

#[async_trait]
pub trait SessionManagement: Send + Sync {
    async fn insert_session(&self, session: Session) -> Result<Session, LedgerError>;

    async fn fetch_session(&self, token: &str) -> Result<Session, LedgerError>;

    /// Removes the session. Removing a session that does not exist is not an error.
    async fn delete_session(&self, token: &str) -> Result<(), LedgerError>;
}
