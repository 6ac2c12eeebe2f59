//! Asynchronous inventory service
//!
//! [`AsyncInventoryService`] offers the same operations as the synchronous
//! service on top of any [`AsyncStore`], for callers already running inside
//! a tokio runtime. [`AsyncStrategy`] wraps it in an owned multi-threaded
//! runtime so the CLI can drive it through [`InventoryStrategy`].
//!
//! # Architecture
//!
//! ```text
//! AsyncStrategy
//!     ├── tokio runtime (worker_threads from InventoryConfig)
//!     └── AsyncInventoryService
//!         ├── AsyncStore (AsyncCsvStore: csv-async over tokio::fs)
//!         ├── TableLocks<tokio::sync::Mutex<()>>
//!         └── Ledger / TransactionRecorder (shared with the sync service)
//! ```
//!
//! Table locks are held across the load and save awaits, so concurrent tasks
//! sharing one service are serialized per table exactly like threads sharing
//! the synchronous service.

use crate::core::clock::SystemClock;
use crate::core::ledger::{BatchOutcome, Ledger};
use crate::core::reconciler::reconcile;
use crate::core::temporal::Locale;
use crate::core::traits::Clock;
use crate::core::transaction_log::{validate_log_entries, TransactionRecorder};
use crate::io::async_store::{AsyncCsvStore, AsyncStore};
use crate::io::store::{INVENTORY_LEDGER, LEDGER_HEADERS, LOG_HEADERS, TRANSACTIONS_LOG};
use crate::io::table::Table;
use crate::strategy::locks::TableLocks;
use crate::strategy::{InventoryConfig, InventoryStrategy};
use crate::types::{InventoryError, MovementRequest, ProductRecord, TransactionLogEntry};
use chrono::NaiveDate;
use tokio::sync::Mutex;

/// Inventory operations over an asynchronous table store
pub struct AsyncInventoryService<S, C> {
    store: S,
    clock: C,
    locale: Locale,
    recorder: TransactionRecorder,
    locks: TableLocks<Mutex<()>>,
}

impl<S: AsyncStore, C: Clock> AsyncInventoryService<S, C> {
    pub fn new(store: S, clock: C, locale: Locale) -> Self {
        AsyncInventoryService {
            store,
            clock,
            locale,
            recorder: TransactionRecorder::new(locale),
            locks: TableLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load_or_new(&self, name: &str, headers: &[&str]) -> Result<Table, InventoryError> {
        match self.store.load(name).await {
            Ok(table) => Ok(table),
            Err(e) if e.is_not_found() => {
                tracing::debug!(table = name, "table absent, starting empty");
                Ok(Table::new(name, headers))
            }
            Err(e) => Err(e),
        }
    }

    /// Create both tables with their header rows if they do not exist
    pub async fn bootstrap(&self) -> Result<(), InventoryError> {
        for (name, headers) in [
            (TRANSACTIONS_LOG, &LOG_HEADERS[..]),
            (INVENTORY_LEDGER, &LEDGER_HEADERS[..]),
        ] {
            let lock = self.locks.get(name);
            let _guard = lock.lock().await;
            if self.store.ensure(name, headers).await? {
                tracing::info!(table = name, "created table");
            }
        }
        Ok(())
    }

    /// Apply a batch of adjustments to the ledger
    ///
    /// See [`InventoryService::record_batch_adjustments`](crate::strategy::InventoryService::record_batch_adjustments).
    pub async fn record_batch_adjustments(
        &self,
        entries: &[MovementRequest],
    ) -> Result<BatchOutcome, InventoryError> {
        if entries.is_empty() {
            return Err(InventoryError::validation(None, "no adjustments provided"));
        }

        let lock = self.locks.get(INVENTORY_LEDGER);
        let _guard = lock.lock().await;

        let today = self.clock.today();
        let mut table = self.load_or_new(INVENTORY_LEDGER, &LEDGER_HEADERS).await?;
        reconcile(&mut table, today, self.locale)?;

        let outcome = Ledger::open(&mut table, today, self.locale)?.apply_batch(entries);
        self.store.save(&table).await?;

        tracing::info!(
            items = entries.len(),
            rejected = outcome.errors().len(),
            "applied adjustment batch"
        );
        Ok(outcome)
    }

    /// Receive stock for a product, creating it if needed
    pub async fn upsert_product(&self, product_id: &str, name: &str, quantity: i64) -> Result<(), InventoryError> {
        if product_id.trim().is_empty() {
            return Err(InventoryError::validation(None, "product ID is required"));
        }
        if name.trim().is_empty() {
            return Err(InventoryError::validation(Some(product_id.trim()), "name is required"));
        }

        let lock = self.locks.get(INVENTORY_LEDGER);
        let _guard = lock.lock().await;

        let today = self.clock.today();
        let mut table = self.load_or_new(INVENTORY_LEDGER, &LEDGER_HEADERS).await?;
        reconcile(&mut table, today, self.locale)?;

        Ledger::open(&mut table, today, self.locale)?.upsert(product_id, name.trim(), quantity)?;
        self.store.save(&table).await
    }

    pub async fn inventory_snapshot(&self) -> Result<Vec<ProductRecord>, InventoryError> {
        self.inventory_snapshot_on(self.clock.today()).await
    }

    /// Current ledger contents, reconciled for `today`
    ///
    /// Reconciliation is saved back only when it reset at least one row.
    pub async fn inventory_snapshot_on(&self, today: NaiveDate) -> Result<Vec<ProductRecord>, InventoryError> {
        let lock = self.locks.get(INVENTORY_LEDGER);
        let _guard = lock.lock().await;

        let mut table = match self.store.load(INVENTORY_LEDGER).await {
            Ok(table) => table,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let reset = reconcile(&mut table, today, self.locale)?;
        let records = Ledger::open(&mut table, today, self.locale)?.records();
        if reset > 0 {
            self.store.save(&table).await?;
        }
        Ok(records)
    }

    /// Append valid entries to the transaction log, returning how many were written
    pub async fn append_transactions(&self, entries: &[MovementRequest]) -> Result<usize, InventoryError> {
        if entries.is_empty() {
            return Err(InventoryError::validation(None, "no log entries provided"));
        }
        let (movements, skipped) = validate_log_entries(entries);

        let lock = self.locks.get(TRANSACTIONS_LOG);
        let _guard = lock.lock().await;

        let mut table = self.load_or_new(TRANSACTIONS_LOG, &LOG_HEADERS).await?;
        let now = self.clock.now();
        for movement in &movements {
            self.recorder.append(&mut table, movement, now)?;
        }
        self.store.save(&table).await?;

        tracing::info!(appended = movements.len(), skipped, "appended transactions");
        Ok(movements.len())
    }

    pub async fn transaction_log(&self) -> Result<Vec<TransactionLogEntry>, InventoryError> {
        match self.store.load(TRANSACTIONS_LOG).await {
            Ok(table) => self.recorder.read(&table),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// Async service driven from synchronous code through an owned runtime
pub struct AsyncStrategy {
    runtime: tokio::runtime::Runtime,
    service: AsyncInventoryService<AsyncCsvStore, SystemClock>,
}

impl AsyncStrategy {
    /// Build the runtime and service described by `config`
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Io` if the runtime cannot be created.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .enable_all()
            .build()
            .map_err(|e| InventoryError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        Ok(AsyncStrategy {
            runtime,
            service: AsyncInventoryService::new(
                AsyncCsvStore::new(&config.data_dir),
                SystemClock,
                config.locale,
            ),
        })
    }
}

impl InventoryStrategy for AsyncStrategy {
    fn bootstrap(&self) -> Result<(), InventoryError> {
        self.runtime.block_on(self.service.bootstrap())
    }

    fn record_batch_adjustments(&self, entries: &[MovementRequest]) -> Result<BatchOutcome, InventoryError> {
        self.runtime
            .block_on(self.service.record_batch_adjustments(entries))
    }

    fn upsert_product(&self, product_id: &str, name: &str, quantity: i64) -> Result<(), InventoryError> {
        self.runtime
            .block_on(self.service.upsert_product(product_id, name, quantity))
    }

    fn inventory_snapshot(&self) -> Result<Vec<ProductRecord>, InventoryError> {
        self.runtime.block_on(self.service.inventory_snapshot())
    }

    fn append_transactions(&self, entries: &[MovementRequest]) -> Result<usize, InventoryError> {
        self.runtime.block_on(self.service.append_transactions(entries))
    }

    fn transaction_log(&self) -> Result<Vec<TransactionLogEntry>, InventoryError> {
        self.runtime.block_on(self.service.transaction_log())
    }
}
