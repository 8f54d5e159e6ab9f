//! # Coherence cache
//!
//! An in-memory shadow of the ledger. It is never authoritative: entries are populated lazily on reads and dropped or
//! replaced whenever the ledger is written through the cache. Each entity kind has its own lock, so a burst of
//! balance reads never blocks order updates.
mod entity_cache;
mod ledger_cache;

pub use ledger_cache::LedgerCache;
