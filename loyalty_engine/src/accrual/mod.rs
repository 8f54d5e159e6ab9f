//! # Accrual reconciliation
//!
//! Orders start out `NEW` and only the external accrual service can say how many points they earn. This module keeps
//! asking it:
//!
//! * [`AccrualClient`] performs one status request and classifies the answer. [`HttpAccrualClient`] is the reqwest
//!   implementation.
//! * [`reconcile_order`] turns one answer into at most one ledger update.
//! * [`AccrualPoller`] runs reconciliation cycles forever: fetch a batch of pending orders, reconcile them all
//!   concurrently, then adjust the batch size ([`AdaptiveLimit`]) and sleep according to how the cycle went.
mod client;
mod errors;
mod limiter;
mod poller;
mod worker;

pub use client::{AccrualClient, AccrualOrder, AccrualResponse, HttpAccrualClient};
pub use errors::AccrualError;
pub use limiter::{AdaptiveLimit, CycleOutcome, Pause, DEFAULT_CONCURRENCY_LIMIT};
pub use poller::{AccrualPoller, CycleReport, PollerConfig, PollerHandle, PollerState};
pub use worker::{reconcile_order, ReconcileOutcome};
