#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use loyalty_engine::{
    accrual::{AccrualClient, AccrualError, AccrualOrder, AccrualResponse},
    db_types::{NewOrder, NewUser, Order, OrderStatusType, Points, User},
    test_utils::prepare_env::{new_test_database, tear_down},
    LedgerCache,
    SqliteDatabase,
};
use mockall::mock;

mock! {
    pub Accrual {}

    #[async_trait]
    impl AccrualClient for Accrual {
        async fn fetch_accrual(&self, order_id: i64) -> Result<AccrualResponse, AccrualError>;
    }
}

pub type TestCache = Arc<LedgerCache<SqliteDatabase>>;

pub async fn setup() -> TestCache {
    let db = new_test_database(5).await;
    Arc::new(LedgerCache::new(db))
}

pub async fn shutdown(cache: TestCache) {
    let db = cache.db().clone();
    drop(cache);
    tear_down(db).await;
}

pub async fn new_user(cache: &TestCache, login: &str) -> User {
    cache.add_user(NewUser::new(login, format!("hash-of-{login}"))).await.expect("Error creating user")
}

pub async fn new_order(cache: &TestCache, id: i64, user_id: i64) -> Order {
    cache.add_order(NewOrder::new(id, user_id)).await.expect("Error creating order")
}

/// Inserts an order and settles it with the given accrual, crediting the owner.
pub async fn processed_order(cache: &TestCache, id: i64, user_id: i64, accrual: i64) -> Order {
    let order = new_order(cache, id, user_id).await;
    let processed = order.with_status(OrderStatusType::Processed, Some(Points::from(accrual)));
    cache.update_order(&processed).await.expect("Error processing order")
}

pub fn accepted(order_id: i64, status: &str, accrual: Option<f64>) -> AccrualResponse {
    AccrualResponse::Accepted(AccrualOrder { order: order_id.to_string(), status: status.to_string(), accrual })
}

/// An accrual service that replays a script of responses per order. Once an order's script runs out, the last
/// response is repeated.
#[derive(Default)]
pub struct ScriptedAccrual {
    scripts: Mutex<HashMap<i64, VecDeque<AccrualResponse>>>,
    last: Mutex<HashMap<i64, AccrualResponse>>,
    calls: Mutex<usize>,
}

impl ScriptedAccrual {
    pub fn script(&self, order_id: i64, responses: Vec<AccrualResponse>) {
        self.scripts.lock().unwrap().insert(order_id, responses.into());
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl AccrualClient for ScriptedAccrual {
    async fn fetch_accrual(&self, order_id: i64) -> Result<AccrualResponse, AccrualError> {
        *self.calls.lock().unwrap() += 1;
        let next = self.scripts.lock().unwrap().get_mut(&order_id).and_then(|s| s.pop_front());
        let mut last = self.last.lock().unwrap();
        let response = match next {
            Some(r) => {
                last.insert(order_id, r.clone());
                r
            },
            None => last.get(&order_id).cloned().unwrap_or(AccrualResponse::NoContent),
        };
        Ok(response)
    }
}

/// An accrual service that never answers in time.
pub struct SlowAccrual(pub Duration);

#[async_trait]
impl AccrualClient for SlowAccrual {
    async fn fetch_accrual(&self, _order_id: i64) -> Result<AccrualResponse, AccrualError> {
        tokio::time::sleep(self.0).await;
        Ok(AccrualResponse::NoContent)
    }
}
