use std::{collections::HashMap, fmt::Debug, sync::Arc};

use cucumber::World;
use log::*;
use loyalty_engine::{
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    AuthApi,
    BalanceApi,
    LedgerApiError,
    LedgerCache,
    OrderFlowApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct LedgerWorld {
    pub system: Option<LedgerSystem>,
}

pub struct LedgerSystem {
    pub db_path: String,
    pub cache: Arc<LedgerCache<SqliteDatabase>>,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub balances: BalanceApi<SqliteDatabase>,
    pub auth: AuthApi<SqliteDatabase>,
    pub users: HashMap<String, i64>,
    pub last_error: Option<LedgerApiError>,
}

impl Debug for LedgerSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerSystem ({}, {} users)", self.db_path, self.users.len())
    }
}

impl LedgerWorld {
    pub fn system(&mut self) -> &mut LedgerSystem {
        self.system.as_mut().expect("Ledger system not initialised")
    }
}

impl LedgerSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let cache = Arc::new(LedgerCache::new(db));
        Self {
            db_path: url,
            orders: OrderFlowApi::new(Arc::clone(&cache)),
            balances: BalanceApi::new(Arc::clone(&cache)),
            auth: AuthApi::new(Arc::clone(&cache)),
            cache,
            users: HashMap::new(),
            last_error: None,
        }
    }

    pub fn user_id(&self, login: &str) -> i64 {
        *self.users.get(login).unwrap_or_else(|| panic!("User {login} has not been registered"))
    }

    pub fn record<T>(&mut self, result: Result<T, LedgerApiError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("Recorded error: {e}");
                self.last_error = Some(e);
                None
            },
        }
    }
}
