use cucumber::{given, then, when};
use loyalty_engine::{
    db_types::{OrderStatusType, Points},
    ledger_objects::WithdrawRequest,
    LedgerApiError,
    LedgerError,
};

use crate::cucumber::{ledger_world::LedgerSystem, LedgerWorld};

#[given("a fresh ledger")]
async fn fresh_ledger(world: &mut LedgerWorld) {
    world.system = Some(LedgerSystem::new().await);
}

#[given(expr = "a user '{word}'")]
async fn register_user(world: &mut LedgerWorld, login: String) {
    let sys = world.system();
    let user = sys.auth.register(&login, &format!("hash-{login}")).await.expect("Error registering user");
    sys.users.insert(login, user.id);
}

#[when(expr = "'{word}' uploads order {word}")]
async fn upload_order(world: &mut LedgerWorld, login: String, number: String) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let result = sys.orders.post_order(user_id, &number).await;
    sys.record(result);
}

#[given(expr = "order {int} is processed with an accrual of {float} points")]
async fn process_order(world: &mut LedgerWorld, order_id: i64, accrual: f64) {
    let sys = world.system();
    let order = sys.cache.order(order_id).await.expect("Order does not exist");
    let accrual = Points::from_decimal(accrual).expect("Invalid accrual");
    let result = sys.cache.update_order(&order.with_status(OrderStatusType::Processed, Some(accrual))).await;
    sys.record(result.map_err(LedgerApiError::from));
}

#[when(expr = "'{word}' withdraws {float} points against order {word}")]
async fn withdraw(world: &mut LedgerWorld, login: String, sum: f64, number: String) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let result = sys.balances.withdraw(user_id, WithdrawRequest::new(number, sum)).await;
    sys.record(result);
}

#[then("the request succeeds")]
async fn request_succeeds(world: &mut LedgerWorld) {
    let sys = world.system();
    assert!(sys.last_error.is_none(), "Unexpected error: {:?}", sys.last_error);
}

#[then(expr = "the request fails with '{word}'")]
async fn request_fails(world: &mut LedgerWorld, kind: String) {
    let sys = world.system();
    let err = sys.last_error.as_ref().expect("The request did not fail");
    let matched = match kind.as_str() {
        "InvalidOrderNumber" => matches!(err, LedgerApiError::InvalidOrderNumber(_)),
        "InvalidAmount" => matches!(err, LedgerApiError::InvalidAmount(_)),
        "OrderAlreadyLoadedByUser" => matches!(err, LedgerApiError::Ledger(LedgerError::OrderAlreadyLoadedByUser(_))),
        "OrderAlreadyLoadedByAnotherUser" => {
            matches!(err, LedgerApiError::Ledger(LedgerError::OrderAlreadyLoadedByAnotherUser(_)))
        },
        "OrderFinalized" => matches!(err, LedgerApiError::Ledger(LedgerError::OrderFinalized(_))),
        "NotEnoughFunds" => matches!(err, LedgerApiError::Ledger(LedgerError::NotEnoughFunds)),
        "WithdrawalAlreadyRecordedByUser" => {
            matches!(err, LedgerApiError::Ledger(LedgerError::WithdrawalAlreadyRecordedByUser(_)))
        },
        "WithdrawalAlreadyRecordedByAnotherUser" => {
            matches!(err, LedgerApiError::Ledger(LedgerError::WithdrawalAlreadyRecordedByAnotherUser(_)))
        },
        other => panic!("Unknown error kind in feature file: {other}"),
    };
    assert!(matched, "Expected {kind}, got {err:?}");
}

#[then(expr = "'{word}' has a balance of {float} points with {float} withdrawn")]
async fn check_balance(world: &mut LedgerWorld, login: String, current: f64, withdrawn: f64) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let balance = sys.balances.balance(user_id).await.expect("Error fetching balance");
    assert!((balance.current - current).abs() < 1e-9, "Current balance is {}", balance.current);
    assert!((balance.withdrawn - withdrawn).abs() < 1e-9, "Withdrawn total is {}", balance.withdrawn);
}

#[then(expr = "'{word}' has {int} order(s)")]
async fn check_order_count(world: &mut LedgerWorld, login: String, count: usize) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let orders = sys.orders.orders_for_user(user_id).await.expect("Error fetching orders");
    assert_eq!(orders.len(), count);
}

#[then(expr = "'{word}' has no withdrawals")]
async fn check_no_withdrawals(world: &mut LedgerWorld, login: String) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let withdrawals = sys.balances.withdrawals(user_id).await.expect("Error fetching withdrawals");
    assert!(withdrawals.is_none(), "Expected no withdrawals, got {withdrawals:?}");
}

#[then(expr = "'{word}' has {int} withdrawal(s), the latest against order {word}")]
async fn check_withdrawals(world: &mut LedgerWorld, login: String, count: usize, latest: String) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let withdrawals = sys.balances.withdrawals(user_id).await.expect("Error fetching withdrawals").unwrap_or_default();
    assert_eq!(withdrawals.len(), count);
    assert_eq!(withdrawals[0].order, latest);
}
