//! Per-table mutual exclusion
//!
//! Each logical table gets its own lock so that a load → reconcile → mutate →
//! save sequence on one table never interleaves with another on the same
//! table, while requests on different tables proceed in parallel. Locks are
//! created lazily on first use and live as long as the registry.

use dashmap::DashMap;
use std::sync::Arc;

/// Registry of lazily created locks keyed by table name
///
/// Generic over the lock type so the sync service can use `std::sync::Mutex`
/// and the async service `tokio::sync::Mutex`.
#[derive(Debug)]
pub struct TableLocks<L> {
    locks: DashMap<String, Arc<L>>,
}

impl<L: Default> TableLocks<L> {
    pub fn new() -> Self {
        TableLocks {
            locks: DashMap::new(),
        }
    }

    /// Lock guarding `table`, shared by every caller asking for the same name
    pub fn get(&self, table: &str) -> Arc<L> {
        let entry = self.locks.entry(table.to_string()).or_default();
        Arc::<L>::clone(&entry)
    }
}

impl<L: Default> Default for TableLocks<L> {
    fn default() -> Self {
        Self::new()
    }
}
