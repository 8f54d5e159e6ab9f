use rand::Rng;

use crate::accrual::AccrualError;

/// The batch size the poller starts with, and falls back to after a failed cycle.
pub const DEFAULT_CONCURRENCY_LIMIT: u32 = 1000;
/// Bounds (inclusive) of the random batch size chosen after the service rate-limits a cycle.
pub const THROTTLED_LIMIT_RANGE: (u32, u32) = (2, 11);

/// How a reconciliation cycle went, as far as the limit is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every worker finished without error.
    Success,
    /// The first error of the cycle was a 429.
    TooManyRequests,
    /// The first error of the cycle was anything else.
    Failure,
    /// Pending orders could not be read, so nothing was dispatched.
    FetchFailed,
}

impl CycleOutcome {
    pub fn from_first_error(error: Option<&AccrualError>) -> Self {
        match error {
            None => CycleOutcome::Success,
            Some(AccrualError::TooManyRequests) => CycleOutcome::TooManyRequests,
            Some(_) => CycleOutcome::Failure,
        }
    }
}

/// How long to wait before the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Short,
    Long,
}

/// The number of pending orders fetched (and so the number of concurrent requests made) per cycle.
///
/// The limit grows by one after every clean cycle. A rate-limited cycle drops it to a small random value, so that
/// the poller probes the service gently before growing again. Any other failure resets it to the default.
#[derive(Debug, Clone)]
pub struct AdaptiveLimit {
    current: u32,
    default: u32,
}

impl Default for AdaptiveLimit {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY_LIMIT)
    }
}

impl AdaptiveLimit {
    pub fn new(default: u32) -> Self {
        let default = default.max(1);
        Self { current: default, default }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Adjusts the limit for the next cycle and says how long to wait before it.
    pub fn adjust<R: Rng>(&mut self, outcome: CycleOutcome, rng: &mut R) -> Pause {
        match outcome {
            CycleOutcome::Success => {
                self.current = self.current.saturating_add(1);
                Pause::Short
            },
            CycleOutcome::TooManyRequests => {
                let (lo, hi) = THROTTLED_LIMIT_RANGE;
                self.current = rng.gen_range(lo..=hi);
                Pause::Long
            },
            CycleOutcome::Failure => {
                self.current = self.default;
                Pause::Long
            },
            CycleOutcome::FetchFailed => Pause::Short,
        }
    }
}
