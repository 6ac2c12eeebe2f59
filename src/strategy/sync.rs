//! Synchronous inventory service
//!
//! [`InventoryService`] runs every inventory operation against a [`Store`]
//! on the calling thread. Each mutating request follows the same pipeline:
//!
//! ```text
//! lock table → load (or start empty) → reconcile → mutate → save → unlock
//! ```
//!
//! # Concurrency
//!
//! Requests are serialized per table through a [`TableLocks`] registry, so
//! callers sharing one service instance never lose an update. Separate
//! processes writing the same directory are not coordinated; the last save
//! wins.

use crate::core::ledger::{BatchOutcome, Ledger};
use crate::core::reconciler::reconcile;
use crate::core::temporal::Locale;
use crate::core::traits::Clock;
use crate::core::transaction_log::{validate_log_entries, TransactionRecorder};
use crate::io::store::{Store, INVENTORY_LEDGER, LEDGER_HEADERS, LOG_HEADERS, TRANSACTIONS_LOG};
use crate::io::table::Table;
use crate::strategy::locks::TableLocks;
use crate::strategy::InventoryStrategy;
use crate::types::{InventoryError, MovementRequest, ProductRecord, TransactionLogEntry};
use chrono::NaiveDate;
use std::sync::{Mutex, PoisonError};

/// Inventory operations over a synchronous store
pub struct InventoryService<S, C> {
    store: S,
    clock: C,
    locale: Locale,
    recorder: TransactionRecorder,
    locks: TableLocks<Mutex<()>>,
}

impl<S: Store, C: Clock> InventoryService<S, C> {
    pub fn new(store: S, clock: C, locale: Locale) -> Self {
        InventoryService {
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

    /// Run `f` while holding the lock for `table`
    fn with_table_lock<T>(&self, table: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.locks.get(table);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Load a table, starting from an empty one with `headers` if it is absent
    fn load_or_new(&self, name: &str, headers: &[&str]) -> Result<Table, InventoryError> {
        match self.store.load(name) {
            Ok(table) => Ok(table),
            Err(e) if e.is_not_found() => {
                tracing::debug!(table = name, "table absent, starting empty");
                Ok(Table::new(name, headers))
            }
            Err(e) => Err(e),
        }
    }

    /// Create both tables with their header rows if they do not exist
    pub fn bootstrap(&self) -> Result<(), InventoryError> {
        for (name, headers) in [
            (TRANSACTIONS_LOG, &LOG_HEADERS[..]),
            (INVENTORY_LEDGER, &LEDGER_HEADERS[..]),
        ] {
            let created = self.with_table_lock(name, || self.store.ensure(name, headers))?;
            if created {
                tracing::info!(table = name, "created table");
            }
        }
        Ok(())
    }

    /// Apply a batch of adjustments to the ledger
    ///
    /// Every item is attempted; per-item failures are returned in the
    /// outcome and the ledger is saved with all accepted items applied.
    ///
    /// # Errors
    ///
    /// - `InventoryError::Validation` if `entries` is empty
    /// - Store and schema errors, in which case nothing is saved
    pub fn record_batch_adjustments(
        &self,
        entries: &[MovementRequest],
    ) -> Result<BatchOutcome, InventoryError> {
        if entries.is_empty() {
            return Err(InventoryError::validation(None, "no adjustments provided"));
        }

        self.with_table_lock(INVENTORY_LEDGER, || {
            let today = self.clock.today();
            let mut table = self.load_or_new(INVENTORY_LEDGER, &LEDGER_HEADERS)?;
            reconcile(&mut table, today, self.locale)?;

            let outcome = Ledger::open(&mut table, today, self.locale)?.apply_batch(entries);
            self.store.save(&table)?;

            tracing::info!(
                items = entries.len(),
                rejected = outcome.errors().len(),
                "applied adjustment batch"
            );
            Ok(outcome)
        })
    }

    /// Receive stock for a product, creating it if needed
    ///
    /// # Errors
    ///
    /// - `InventoryError::Validation` if `product_id` or `name` is blank
    /// - `InventoryError::ArithmeticOverflow` if the new totals overflow
    /// - Store and schema errors
    pub fn upsert_product(&self, product_id: &str, name: &str, quantity: i64) -> Result<(), InventoryError> {
        if product_id.trim().is_empty() {
            return Err(InventoryError::validation(None, "product ID is required"));
        }
        if name.trim().is_empty() {
            return Err(InventoryError::validation(Some(product_id.trim()), "name is required"));
        }

        self.with_table_lock(INVENTORY_LEDGER, || {
            let today = self.clock.today();
            let mut table = self.load_or_new(INVENTORY_LEDGER, &LEDGER_HEADERS)?;
            reconcile(&mut table, today, self.locale)?;

            Ledger::open(&mut table, today, self.locale)?.upsert(product_id, name.trim(), quantity)?;
            self.store.save(&table)
        })
    }

    /// Current ledger contents, reconciled for the clock's date
    pub fn inventory_snapshot(&self) -> Result<Vec<ProductRecord>, InventoryError> {
        self.inventory_snapshot_on(self.clock.today())
    }

    /// Current ledger contents, reconciled for `today`
    ///
    /// Reconciliation is saved back only when it reset at least one row.
    /// A missing ledger yields an empty list.
    pub fn inventory_snapshot_on(&self, today: NaiveDate) -> Result<Vec<ProductRecord>, InventoryError> {
        self.with_table_lock(INVENTORY_LEDGER, || {
            let mut table = match self.store.load(INVENTORY_LEDGER) {
                Ok(table) => table,
                Err(e) if e.is_not_found() => return Ok(Vec::new()),
                Err(e) => return Err(e),
            };

            let reset = reconcile(&mut table, today, self.locale)?;
            let records = Ledger::open(&mut table, today, self.locale)?.records();
            if reset > 0 {
                self.store.save(&table)?;
            }
            Ok(records)
        })
    }

    /// Append valid entries to the transaction log
    ///
    /// Invalid entries are skipped with a warning. The log table is created
    /// if it does not exist yet.
    ///
    /// # Returns
    ///
    /// Number of entries appended.
    ///
    /// # Errors
    ///
    /// - `InventoryError::Validation` if `entries` is empty
    /// - Store and schema errors
    pub fn append_transactions(&self, entries: &[MovementRequest]) -> Result<usize, InventoryError> {
        if entries.is_empty() {
            return Err(InventoryError::validation(None, "no log entries provided"));
        }
        let (movements, skipped) = validate_log_entries(entries);

        self.with_table_lock(TRANSACTIONS_LOG, || {
            let mut table = self.load_or_new(TRANSACTIONS_LOG, &LOG_HEADERS)?;
            let now = self.clock.now();
            for movement in &movements {
                self.recorder.append(&mut table, movement, now)?;
            }
            self.store.save(&table)?;

            tracing::info!(appended = movements.len(), skipped, "appended transactions");
            Ok(movements.len())
        })
    }

    /// Every logged transaction; a missing log yields an empty list
    pub fn transaction_log(&self) -> Result<Vec<TransactionLogEntry>, InventoryError> {
        match self.store.load(TRANSACTIONS_LOG) {
            Ok(table) => self.recorder.read(&table),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

impl<S: Store, C: Clock> InventoryStrategy for InventoryService<S, C> {
    fn bootstrap(&self) -> Result<(), InventoryError> {
        InventoryService::bootstrap(self)
    }

    fn record_batch_adjustments(&self, entries: &[MovementRequest]) -> Result<BatchOutcome, InventoryError> {
        InventoryService::record_batch_adjustments(self, entries)
    }

    fn upsert_product(&self, product_id: &str, name: &str, quantity: i64) -> Result<(), InventoryError> {
        InventoryService::upsert_product(self, product_id, name, quantity)
    }

    fn inventory_snapshot(&self) -> Result<Vec<ProductRecord>, InventoryError> {
        InventoryService::inventory_snapshot(self)
    }

    fn append_transactions(&self, entries: &[MovementRequest]) -> Result<usize, InventoryError> {
        InventoryService::append_transactions(self, entries)
    }

    fn transaction_log(&self) -> Result<Vec<TransactionLogEntry>, InventoryError> {
        InventoryService::transaction_log(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::io::memory_store::MemoryStore;
    use crate::io::store::CsvStore;
    use crate::io::table::CellValue;
    use crate::types::MovementType;
    use chrono::NaiveDateTime;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn noon(d: u32) -> NaiveDateTime {
        ymd(d).and_hms_opt(12, 0, 0).unwrap()
    }

    fn ledger_row(id: &str, quantity: i64, daily: i64, date: NaiveDate) -> Vec<CellValue> {
        vec![
            CellValue::from(id),
            CellValue::from("Widget"),
            CellValue::Integer(quantity),
            CellValue::Integer(daily),
            CellValue::Date(date),
        ]
    }

    fn seeded_store(rows: Vec<Vec<CellValue>>) -> MemoryStore {
        let mut table = Table::new(INVENTORY_LEDGER, &LEDGER_HEADERS);
        for row in rows {
            table.push_row(row);
        }
        MemoryStore::with_tables([table])
    }

    #[fixture]
    fn service() -> InventoryService<MemoryStore, FixedClock> {
        InventoryService::new(
            seeded_store(vec![ledger_row("P1", 10, 0, ymd(18))]),
            FixedClock(noon(19)),
            Locale::EnUs,
        )
    }

    #[rstest]
    fn test_sortie_then_insufficient_stock(service: InventoryService<MemoryStore, FixedClock>) {
        let outcome = service
            .record_batch_adjustments(&[MovementRequest::new("Sortie", "P1", 4)])
            .unwrap();
        assert!(outcome.all_succeeded());

        let snapshot = service.inventory_snapshot().unwrap();
        assert_eq!(snapshot[0].quantity, 6);
        assert_eq!(snapshot[0].daily_transactions, -4);
        assert_eq!(snapshot[0].last_transaction_date, Some(ymd(19)));

        let outcome = service
            .record_batch_adjustments(&[MovementRequest::new("Sortie", "P1", 20)])
            .unwrap();
        assert_eq!(
            outcome.errors(),
            &[InventoryError::insufficient_stock("P1", 6, 20)]
        );
        assert_eq!(service.inventory_snapshot().unwrap()[0].quantity, 6);
    }

    #[rstest]
    fn test_empty_batches_are_rejected(service: InventoryService<MemoryStore, FixedClock>) {
        assert!(matches!(
            service.record_batch_adjustments(&[]),
            Err(InventoryError::Validation { .. })
        ));
        assert!(matches!(
            service.append_transactions(&[]),
            Err(InventoryError::Validation { .. })
        ));
    }

    #[rstest]
    #[case::blank_id("", "Widget")]
    #[case::blank_name("P1", "  ")]
    fn test_upsert_requires_id_and_name(
        service: InventoryService<MemoryStore, FixedClock>,
        #[case] id: &str,
        #[case] name: &str,
    ) {
        assert!(matches!(
            service.upsert_product(id, name, 1),
            Err(InventoryError::Validation { .. })
        ));
    }

    #[rstest]
    fn test_upsert_reconciles_before_adding(service: InventoryService<MemoryStore, FixedClock>) {
        service.upsert_product("P1", "Widget", 5).unwrap();
        service.upsert_product("P2", "Gadget", 2).unwrap();

        let snapshot = service.inventory_snapshot().unwrap();
        assert_eq!(
            snapshot,
            vec![
                ProductRecord {
                    product_id: "P1".to_string(),
                    name: "Widget".to_string(),
                    quantity: 15,
                    daily_transactions: 5,
                    last_transaction_date: Some(ymd(19)),
                },
                ProductRecord::received("P2", "Gadget", 2, ymd(19)),
            ]
        );
    }

    #[test]
    fn test_mutation_on_missing_ledger_starts_empty() {
        let service = InventoryService::new(MemoryStore::new(), FixedClock(noon(19)), Locale::EnUs);

        let outcome = service
            .record_batch_adjustments(&[MovementRequest::new("Entree", "P1", 1)])
            .unwrap();
        assert_eq!(outcome.errors(), &[InventoryError::product_not_found("P1")]);

        let table = service.store().load(INVENTORY_LEDGER).unwrap();
        assert_eq!(table.headers(), &LEDGER_HEADERS);
        assert!(table.is_empty());
    }

    #[test]
    fn test_snapshot_of_missing_ledger_is_empty() {
        let service = InventoryService::new(MemoryStore::new(), FixedClock(noon(19)), Locale::EnUs);

        assert!(service.inventory_snapshot().unwrap().is_empty());
        assert!(service.store().load(INVENTORY_LEDGER).unwrap_err().is_not_found());
    }

    #[rstest]
    fn test_snapshot_persists_reconciliation(service: InventoryService<MemoryStore, FixedClock>) {
        let snapshot = service.inventory_snapshot_on(ymd(20)).unwrap();
        assert_eq!(snapshot[0].last_transaction_date, Some(ymd(20)));

        let stored = service.store().load(INVENTORY_LEDGER).unwrap();
        assert_eq!(stored.cell(0, 4), &CellValue::Date(ymd(20)));
    }

    #[test]
    fn test_snapshot_without_reset_does_not_save() {
        let store = seeded_store(vec![vec![
            CellValue::from("P1"),
            CellValue::from("Widget"),
            CellValue::Integer(10),
            CellValue::Integer(3),
            CellValue::Text("Mon Oct 19 2026".to_string()),
        ]]);
        let service = InventoryService::new(store, FixedClock(noon(19)), Locale::EnUs);

        service.inventory_snapshot().unwrap();
        let stored = service.store().load(INVENTORY_LEDGER).unwrap();
        assert_eq!(stored.cell(0, 4), &CellValue::Text("Mon Oct 19 2026".to_string()));
    }

    #[test]
    fn test_append_bootstraps_log_and_skips_invalid() {
        let service = InventoryService::new(MemoryStore::new(), FixedClock(noon(19)), Locale::FrFr);
        let invalid = MovementRequest {
            kind: None,
            ..MovementRequest::new("Entree", "P2", 1)
        };

        let appended = service
            .append_transactions(&[MovementRequest::new("Entree", "P1", 5), invalid])
            .unwrap();
        assert_eq!(appended, 1);

        let log = service.transaction_log().unwrap();
        assert_eq!(
            log,
            vec![TransactionLogEntry {
                kind: MovementType::Entree,
                product: "P1".to_string(),
                quantity: 5,
                occurred_at: Some(noon(19)),
            }]
        );
    }

    #[test]
    fn test_transaction_log_of_missing_table_is_empty() {
        let service = InventoryService::new(MemoryStore::new(), FixedClock(noon(19)), Locale::EnUs);
        assert!(service.transaction_log().unwrap().is_empty());
    }

    #[test]
    fn test_bootstrap_creates_both_tables_once() {
        let dir = TempDir::new().unwrap();
        let service = InventoryService::new(CsvStore::new(dir.path()), FixedClock(noon(19)), Locale::EnUs);

        service.bootstrap().unwrap();
        service.upsert_product("P1", "Widget", 1).unwrap();
        service.bootstrap().unwrap();

        assert_eq!(service.inventory_snapshot().unwrap().len(), 1);
        assert!(service.transaction_log().unwrap().is_empty());
    }

    #[test]
    fn test_date_like_product_ids_survive_save() {
        let dir = TempDir::new().unwrap();
        let service = InventoryService::new(CsvStore::new(dir.path()), FixedClock(noon(19)), Locale::EnUs);
        let ids = ["2026-1-5", "1-2-3", "9:5:0"];
        for id in ids {
            service.upsert_product(id, "12:0:0", 3).unwrap();
        }

        let snapshot = service.inventory_snapshot().unwrap();
        assert_eq!(
            snapshot.iter().map(|r| r.product_id.as_str()).collect::<Vec<_>>(),
            ids
        );
        assert!(snapshot.iter().all(|r| r.name == "12:0:0"));

        let outcome = service
            .record_batch_adjustments(&[MovementRequest::new("Sortie", "2026-1-5", 1)])
            .unwrap();
        assert!(outcome.all_succeeded());
        assert_eq!(service.inventory_snapshot().unwrap()[0].quantity, 2);
    }

    #[rstest]
    #[case(Locale::FrFr, Locale::EnUs)]
    #[case(Locale::EnUs, Locale::FrFr)]
    #[case(Locale::Iso, Locale::EnUs)]
    #[case(Locale::FrFr, Locale::Iso)]
    fn test_log_written_in_one_locale_reads_in_another(#[case] written: Locale, #[case] read: Locale) {
        let dir = TempDir::new().unwrap();
        let writer = InventoryService::new(CsvStore::new(dir.path()), FixedClock(noon(19)), written);
        writer
            .append_transactions(&[MovementRequest::new("Entree", "P1", 5)])
            .unwrap();

        let reader = InventoryService::new(CsvStore::new(dir.path()), FixedClock(noon(19)), read);
        let log = reader.transaction_log().unwrap();
        assert_eq!(log[0].occurred_at, Some(noon(19)));
    }

    #[test]
    fn test_schema_error_saves_nothing() {
        let store = MemoryStore::with_tables([Table::new(INVENTORY_LEDGER, &["ProductID", "Name"])]);
        let service = InventoryService::new(store, FixedClock(noon(19)), Locale::EnUs);

        let error = service
            .record_batch_adjustments(&[MovementRequest::new("Entree", "P1", 1)])
            .unwrap_err();
        assert!(matches!(error, InventoryError::Schema { .. }));
    }

    #[test]
    fn test_concurrent_adjustments_lose_no_updates() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(InventoryService::new(
            CsvStore::new(dir.path()),
            FixedClock(noon(19)),
            Locale::EnUs,
        ));
        service.upsert_product("P1", "Widget", 0).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        let outcome = service
                            .record_batch_adjustments(&[MovementRequest::new("Entree", "P1", 1)])
                            .unwrap();
                        assert!(outcome.all_succeeded());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.inventory_snapshot().unwrap()[0].quantity, 80);
    }
}
