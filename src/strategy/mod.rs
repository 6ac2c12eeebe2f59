//! Inventory service strategies
//!
//! This module defines the Strategy pattern for running inventory operations
//! against on-disk tables. The synchronous strategy works on the calling
//! thread through the `csv` crate; the asynchronous strategy runs the same
//! pipeline on a tokio runtime through `csv-async`. Both are selected at
//! runtime from the CLI and share the table layout, so either can be used on
//! the same data directory.

use crate::cli::StrategyType;
use crate::core::clock::SystemClock;
use crate::core::ledger::BatchOutcome;
use crate::core::temporal::Locale;
use crate::io::store::CsvStore;
use crate::types::{InventoryError, MovementRequest, ProductRecord, TransactionLogEntry};
use std::path::PathBuf;

pub mod r#async;
pub mod locks;
pub mod sync;

pub use self::r#async::{AsyncInventoryService, AsyncStrategy};
pub use locks::TableLocks;
pub use sync::InventoryService;

/// Default directory holding the table files
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Runtime configuration for the inventory services
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryConfig {
    /// Directory holding one CSV file per table
    pub data_dir: PathBuf,
    /// Locale used to format and read log dates and times
    pub locale: Locale,
    /// Worker threads of the async runtime
    pub worker_threads: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            locale: Locale::default(),
            worker_threads: num_cpus::get(),
        }
    }
}

impl InventoryConfig {
    /// Create a config, replacing invalid values with defaults
    pub fn new(data_dir: PathBuf, locale: Locale, worker_threads: usize) -> Self {
        let default = Self::default();

        let data_dir = if data_dir.as_os_str().is_empty() {
            tracing::warn!(default = %default.data_dir.display(), "empty data directory, using default");
            default.data_dir
        } else {
            data_dir
        };

        let worker_threads = if worker_threads == 0 {
            tracing::warn!(
                worker_threads,
                default = default.worker_threads,
                "invalid worker thread count, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self {
            data_dir,
            locale,
            worker_threads,
        }
    }
}

/// Inventory operations behind a runtime-selected implementation
///
/// Batch operations never abort early: per-item failures are reported in
/// the returned [`BatchOutcome`] or skipped with a warning. An `Err` means
/// the request as a whole failed and nothing was saved.
pub trait InventoryStrategy: Send + Sync {
    /// Create both tables with their header rows if absent
    fn bootstrap(&self) -> Result<(), InventoryError>;

    /// Apply a batch of Entree/Sortie adjustments to the ledger
    fn record_batch_adjustments(&self, entries: &[MovementRequest]) -> Result<BatchOutcome, InventoryError>;

    /// Receive stock for a product, creating it if needed
    fn upsert_product(&self, product_id: &str, name: &str, quantity: i64) -> Result<(), InventoryError>;

    /// Ledger contents after reconciling daily counters
    fn inventory_snapshot(&self) -> Result<Vec<ProductRecord>, InventoryError>;

    /// Append valid entries to the transaction log, returning how many were written
    fn append_transactions(&self, entries: &[MovementRequest]) -> Result<usize, InventoryError>;

    /// Every logged transaction
    fn transaction_log(&self) -> Result<Vec<TransactionLogEntry>, InventoryError>;
}

/// Create an inventory strategy based on the specified strategy type
///
/// # Errors
///
/// Returns `InventoryError::Io` if the async runtime cannot be created.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: &InventoryConfig,
) -> Result<Box<dyn InventoryStrategy>, InventoryError> {
    tracing::debug!(?strategy_type, data_dir = %config.data_dir.display(), "creating strategy");
    match strategy_type {
        StrategyType::Sync => Ok(Box::new(InventoryService::new(
            CsvStore::new(&config.data_dir),
            SystemClock,
            config.locale,
        ))),
        StrategyType::Async => Ok(Box::new(AsyncStrategy::new(config)?)),
    }
}
