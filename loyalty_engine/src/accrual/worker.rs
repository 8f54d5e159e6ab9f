use std::time::Duration;

use log::*;

use crate::{
    accrual::{AccrualClient, AccrualError, AccrualResponse},
    cache::LedgerCache,
    db_types::{Order, OrderStatusType, Points},
    traits::{LedgerError, LedgerStore},
};

/// What a single reconciliation did. Everything other than `Updated` left the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Updated(Order),
    /// The accrual service has not registered the order yet.
    NotRegistered,
    /// The service answered about a different order.
    OrderMismatch(String),
    UnknownStatus(String),
    StillProcessing,
    /// The reported accrual was negative or not a number.
    InvalidAccrual,
    /// The order reached a final state before this update could be applied.
    AlreadyFinal,
}

/// Asks the accrual service about `order` and applies the answer to the ledger.
///
/// Responses that say nothing new are no-ops. Errors mean the whole cycle should back off: the service is rate
/// limiting ([`AccrualError::TooManyRequests`]), broken, unreachable, or the ledger refused a legitimate update.
/// `time_budget` bounds the request whatever the client's own timeout is.
pub async fn reconcile_order<B, C>(
    order: &Order,
    cache: &LedgerCache<B>,
    client: &C,
    time_budget: Duration,
) -> Result<ReconcileOutcome, AccrualError>
where
    B: LedgerStore,
    C: AccrualClient + ?Sized,
{
    let response = tokio::time::timeout(time_budget, client.fetch_accrual(order.id))
        .await
        .map_err(|_| AccrualError::Transport(format!("No reply for order {} within {time_budget:?}", order.id)))??;
    let body = match response {
        AccrualResponse::Accepted(body) => body,
        AccrualResponse::NoContent => {
            trace!("🔁️ Order {} is not registered with the accrual service yet", order.id);
            return Ok(ReconcileOutcome::NotRegistered);
        },
        AccrualResponse::TooManyRequests => return Err(AccrualError::TooManyRequests),
        AccrualResponse::ServerError => return Err(AccrualError::ServerError),
        AccrualResponse::UnexpectedStatus(code) => return Err(AccrualError::UnexpectedStatus(code)),
    };
    if body.order != order.id.to_string() {
        warn!("🔁️ Asked about order {} but the accrual service answered about {}", order.id, body.order);
        return Ok(ReconcileOutcome::OrderMismatch(body.order));
    }
    let status = match body.status.parse::<OrderStatusType>() {
        Ok(status) => status,
        Err(_) => {
            warn!("🔁️ Unknown status '{}' reported for order {}", body.status, order.id);
            return Ok(ReconcileOutcome::UnknownStatus(body.status));
        },
    };
    if status == OrderStatusType::Processing && order.status == OrderStatusType::Processing {
        return Ok(ReconcileOutcome::StillProcessing);
    }
    let accrual = if status == OrderStatusType::Processed {
        match Points::from_decimal(body.accrual.unwrap_or_default()) {
            Ok(points) if !points.is_negative() => Some(points),
            Ok(points) => {
                warn!("🔁️ Ignoring negative accrual of {points} for order {}", order.id);
                return Ok(ReconcileOutcome::InvalidAccrual);
            },
            Err(e) => {
                warn!("🔁️ Ignoring accrual for order {}. {e}", order.id);
                return Ok(ReconcileOutcome::InvalidAccrual);
            },
        }
    } else {
        None
    };
    match cache.update_order(&order.with_status(status, accrual)).await {
        Ok(updated) => {
            debug!("🔁️ Order {} reconciled to {}", updated.id, updated.status);
            Ok(ReconcileOutcome::Updated(updated))
        },
        Err(LedgerError::OrderFinalized(id)) => {
            info!("🔁️ Order {id} was already final. The update was discarded.");
            Ok(ReconcileOutcome::AlreadyFinal)
        },
        Err(e) => Err(e.into()),
    }
}
