//! Users and sessions.
//!
//! Passwords are hashed by the caller before they get here. The ledger stores the hash and hands it back so the caller
//! can verify a login attempt.
use std::{fmt::Debug, sync::Arc};

use chrono::Duration;
use log::*;

use crate::{
    cache::LedgerCache,
    db_types::{NewUser, Session, User},
    traits::LedgerStore,
    LedgerApiError,
};

pub struct AuthApi<B> {
    cache: Arc<LedgerCache<B>>,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.cache)
    }
}

impl<B> AuthApi<B>
where B: LedgerStore
{
    pub fn new(cache: Arc<LedgerCache<B>>) -> Self {
        Self { cache }
    }

    /// Creates a user with an empty balance.
    pub async fn register(&self, login: &str, password_hash: &str) -> Result<User, LedgerApiError> {
        let user = self.cache.add_user(NewUser::new(login, password_hash)).await?;
        info!("👤️ Registered user {} ({})", user.login, user.id);
        Ok(user)
    }

    pub async fn user(&self, user_id: i64) -> Result<User, LedgerApiError> {
        Ok(self.cache.user(user_id).await?)
    }

    pub async fn user_by_login(&self, login: &str) -> Result<User, LedgerApiError> {
        Ok(self.cache.user_by_login(login).await?)
    }

    pub async fn open_session(&self, user_id: i64, ttl: Duration) -> Result<Session, LedgerApiError> {
        let session = self.cache.add_session(Session::new(user_id, ttl)).await?;
        debug!("👤️ Session opened for user {user_id}. Expires at {}", session.expires_at);
        Ok(session)
    }

    /// Looks up a session by token. An expired session is removed and reported as [`LedgerApiError::SessionExpired`].
    pub async fn session(&self, token: &str) -> Result<Session, LedgerApiError> {
        let session = self.cache.session(token).await?;
        if session.is_expired() {
            debug!("👤️ Session for user {} has expired", session.user_id);
            self.cache.remove_session(token).await?;
            return Err(LedgerApiError::SessionExpired);
        }
        Ok(session)
    }

    pub async fn close_session(&self, token: &str) -> Result<(), LedgerApiError> {
        self.cache.remove_session(token).await?;
        Ok(())
    }
}
