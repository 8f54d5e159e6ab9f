//! # Loyalty server
//! This crate hosts the daemon that keeps the loyalty ledger settled. It is responsible for:
//! * Reading its configuration from the environment.
//! * Opening (and, if asked to, migrating) the ledger database.
//! * Running the accrual poller until the process is asked to stop, then stopping it within a deadline.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
pub mod accrual_worker;
pub mod cli;
pub mod config;
pub mod errors;
pub mod server;
