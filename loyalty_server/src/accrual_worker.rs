use std::sync::Arc;

use log::*;
use loyalty_engine::{
    accrual::{AccrualClient, AccrualPoller, PollerHandle},
    LedgerCache,
    LedgerStore,
};

use crate::config::AccrualConfig;

/// Starts the accrual poller in the background. The poller keeps running until [`PollerHandle::stop`] is called or
/// the handle is dropped.
pub fn start_accrual_worker<B, C>(cache: Arc<LedgerCache<B>>, client: Arc<C>, config: &AccrualConfig) -> PollerHandle
where
    B: LedgerStore,
    C: AccrualClient + ?Sized + 'static,
{
    let poller_config = config.poller_config();
    info!(
        "🔁️ Accrual worker starting against {}. Initial limit: {}, time unit: {}ms, request timeout: {}s",
        config.address,
        poller_config.initial_limit,
        poller_config.time_unit.as_millis(),
        poller_config.request_timeout().as_secs()
    );
    AccrualPoller::new(cache, client, poller_config).start()
}
