//! Watchlist Invariants:
//!
//! 1. No identifier appears twice
//! 2. Order is insertion order
//! 3. Only identifiers are stored, never movie snapshots
//! 4. Entries never expire; only explicit remove/clear deletes them

pub mod entity;

pub use entity::{Watchlist, WatchlistRecord, WATCHLIST_PAGE_SIZE};
