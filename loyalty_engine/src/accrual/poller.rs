use std::{fmt::Display, sync::Arc, time::Duration};

use log::*;
use tokio::{
    sync::watch,
    task::{JoinHandle, JoinSet},
};

use crate::{
    accrual::{
        limiter::{AdaptiveLimit, CycleOutcome, Pause, DEFAULT_CONCURRENCY_LIMIT},
        reconcile_order,
        AccrualClient,
        AccrualError,
        ReconcileOutcome,
    },
    cache::LedgerCache,
    traits::LedgerStore,
};

/// Timing and sizing of the reconciliation loop. Every duration is expressed as a multiple of `time_unit`, so tests
/// can run the whole schedule in milliseconds.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub initial_limit: u32,
    pub time_unit: Duration,
    /// Pause after a clean cycle, in time units.
    pub short_pause: u32,
    /// Pause after a failed or rate-limited cycle, in time units.
    pub long_pause: u32,
    /// Upper bound on a single accrual request, in time units.
    pub request_budget: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_limit: DEFAULT_CONCURRENCY_LIMIT,
            time_unit: Duration::from_secs(1),
            short_pause: 1,
            long_pause: 60,
            request_budget: 60,
        }
    }
}

impl PollerConfig {
    pub fn with_initial_limit(mut self, limit: u32) -> Self {
        self.initial_limit = limit;
        self
    }

    pub fn with_time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn with_pauses(mut self, short: u32, long: u32) -> Self {
        self.short_pause = short;
        self.long_pause = long;
        self
    }

    pub fn with_request_budget(mut self, units: u32) -> Self {
        self.request_budget = units;
        self
    }

    pub fn pause_duration(&self, pause: Pause) -> Duration {
        match pause {
            Pause::Short => self.time_unit * self.short_pause,
            Pause::Long => self.time_unit * self.long_pause,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.time_unit * self.request_budget
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Fetching,
    Dispatching,
    Waiting,
    Stopped,
}

impl Display for PollerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PollerState::Idle => "Idle",
            PollerState::Fetching => "Fetching",
            PollerState::Dispatching => "Dispatching",
            PollerState::Waiting => "Waiting",
            PollerState::Stopped => "Stopped",
        };
        f.write_str(s)
    }
}

/// A summary of one reconciliation cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// The number of pending orders dispatched to workers.
    pub dispatched: usize,
    /// The number of orders whose ledger entry changed.
    pub updated: usize,
    pub outcome: CycleOutcome,
    /// The first error of the cycle, if any.
    pub error: Option<AccrualError>,
    /// The limit that will be used for the next cycle.
    pub next_limit: u32,
    pub pause: Duration,
}

/// The reconciliation loop.
///
/// The poller owns the concurrency limit. Workers only report how they got on; the poller alone decides the next
/// limit, once every worker of the cycle has finished.
pub struct AccrualPoller<B, C: ?Sized> {
    cache: Arc<LedgerCache<B>>,
    client: Arc<C>,
    config: PollerConfig,
    limit: AdaptiveLimit,
    state: watch::Sender<PollerState>,
}

impl<B, C> AccrualPoller<B, C>
where
    B: LedgerStore,
    C: AccrualClient + ?Sized + 'static,
{
    pub fn new(cache: Arc<LedgerCache<B>>, client: Arc<C>, config: PollerConfig) -> Self {
        let limit = AdaptiveLimit::new(config.initial_limit);
        let (state, _) = watch::channel(PollerState::Idle);
        Self { cache, client, config, limit, state }
    }

    pub fn limit(&self) -> u32 {
        self.limit.current()
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    fn set_state(&self, state: PollerState) {
        self.state.send_replace(state);
    }

    /// Runs one fetch-dispatch-decide cycle. The caller is responsible for waiting `report.pause` before the next one.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.set_state(PollerState::Fetching);
        let limit = self.limit.current();
        let orders = match self.cache.pending_orders(limit).await {
            Ok(orders) => orders,
            Err(e) => {
                error!("🔁️ Could not fetch pending orders. {e}");
                return self.decide(CycleOutcome::FetchFailed, 0, 0, None);
            },
        };
        let dispatched = orders.len();
        trace!("🔁️ Dispatching {dispatched} orders (limit {limit})");
        self.set_state(PollerState::Dispatching);
        let mut workers = JoinSet::new();
        for order in orders {
            let cache = Arc::clone(&self.cache);
            let client = Arc::clone(&self.client);
            let budget = self.config.request_timeout();
            workers.spawn(async move { reconcile_order(&order, cache.as_ref(), client.as_ref(), budget).await });
        }
        let mut updated = 0;
        let mut first_error = None;
        while let Some(joined) = workers.join_next().await {
            let result = joined.map_err(|e| AccrualError::TaskFailed(e.to_string())).and_then(|r| r);
            match result {
                Ok(ReconcileOutcome::Updated(_)) => updated += 1,
                Ok(outcome) => trace!("🔁️ No change: {outcome:?}"),
                Err(e) if first_error.is_none() => {
                    warn!("🔁️ Reconciliation failed. {e}");
                    first_error = Some(e);
                },
                Err(e) => debug!("🔁️ Another reconciliation failed in the same cycle. {e}"),
            }
        }
        let outcome = CycleOutcome::from_first_error(first_error.as_ref());
        self.decide(outcome, dispatched, updated, first_error)
    }

    fn decide(
        &mut self,
        outcome: CycleOutcome,
        dispatched: usize,
        updated: usize,
        error: Option<AccrualError>,
    ) -> CycleReport {
        let pause = self.limit.adjust(outcome, &mut rand::thread_rng());
        let pause = self.config.pause_duration(pause);
        let next_limit = self.limit.current();
        if outcome != CycleOutcome::Success {
            info!("🔁️ Cycle ended with {outcome:?}. Next limit is {next_limit}, pausing for {pause:?}");
        } else if updated > 0 {
            debug!("🔁️ {updated} of {dispatched} orders updated. Next limit is {next_limit}");
        }
        CycleReport { dispatched, updated, outcome, error, next_limit, pause }
    }

    /// Runs cycles until `stop` is set or its sender goes away. Cancellation is only observed between cycles, so
    /// requests in flight always complete.
    async fn run(mut self, mut stop: watch::Receiver<bool>) {
        info!("🔁️ Accrual poller started with limit {}", self.limit.current());
        loop {
            if *stop.borrow_and_update() {
                break;
            }
            let report = self.run_cycle().await;
            self.set_state(PollerState::Waiting);
            tokio::select! {
                _ = stop.changed() => break,
                _ = tokio::time::sleep(report.pause) => {},
            }
            self.set_state(PollerState::Idle);
        }
        self.set_state(PollerState::Stopped);
        info!("🔁️ Accrual poller stopped");
    }

    /// Spawns the reconciliation loop onto the current tokio runtime.
    pub fn start(self) -> PollerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let state = self.state.subscribe();
        let task = tokio::spawn(self.run(stop_rx));
        PollerHandle { stop: stop_tx, state, task }
    }
}

/// Controls a running [`AccrualPoller`]. Dropping the handle also stops the poller, at the end of its current cycle.
pub struct PollerHandle {
    stop: watch::Sender<bool>,
    state: watch::Receiver<PollerState>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Waits until the poller reaches `state`. Returns false if the poller stopped first.
    pub async fn wait_for(&mut self, state: PollerState) -> bool {
        self.state.wait_for(|s| *s == state || *s == PollerState::Stopped).await.map(|s| *s == state).unwrap_or(false)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Asks the poller to stop and waits up to `deadline` for the current cycle to wind down. If the deadline passes,
    /// the task is aborted and [`AccrualError::ShutdownTimedOut`] is returned.
    pub async fn stop(self, deadline: Duration) -> Result<(), AccrualError> {
        let Self { stop, task, .. } = self;
        // The receiver is gone only if the task already ended
        let _ = stop.send(true);
        let mut task = task;
        match tokio::time::timeout(deadline, &mut task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AccrualError::TaskFailed(e.to_string())),
            Err(_) => {
                warn!("🔁️ Accrual poller did not stop within {deadline:?}. Aborting it.");
                task.abort();
                Err(AccrualError::ShutdownTimedOut(deadline))
            },
        }
    }
}
