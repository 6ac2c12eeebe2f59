//! In-process table store
//!
//! Keeps tables in a `DashMap` keyed by logical name. Used wherever the
//! ledger needs a store without a filesystem, such as tests and embedding.

use crate::io::store::Store;
use crate::io::table::Table;
use crate::types::InventoryError;
use dashmap::DashMap;

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given tables
    pub fn with_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let store = Self::new();
        for table in tables {
            store.tables.insert(table.name().to_string(), table);
        }
        store
    }
}

impl Store for MemoryStore {
    fn load(&self, name: &str) -> Result<Table, InventoryError> {
        self.tables
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| InventoryError::not_found(name))
    }

    fn save(&self, table: &Table) -> Result<(), InventoryError> {
        self.tables.insert(table.name().to_string(), table.clone());
        Ok(())
    }
}
