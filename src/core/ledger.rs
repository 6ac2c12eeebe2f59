//! Inventory ledger engine
//!
//! This module provides the [`Ledger`], a typed view over an inventory
//! ledger table that applies stock movements to product rows.
//!
//! The ledger enforces:
//! - Non-negative stock: an outbound movement that would drive a quantity
//!   below zero is rejected and the row is left unchanged
//! - Daily counters: every accepted movement adds its signed amount to the
//!   row's daily counter and stamps the row with today's date
//! - Independent batch items: every item of a batch is attempted, and
//!   "product not found" is reported at most once per product
//!
//! Rows are located through an index from product ID to row position, built
//! once when the ledger is opened. When a file contains the same product ID
//! more than once, the first row wins.

use crate::core::reconciler::{DAILY_TRANSACTIONS, LAST_TRANSACTION_DATE};
use crate::core::temporal::{parse_calendar_date, Locale};
use crate::io::table::{CellValue, Table};
use crate::types::{InventoryError, MovementRequest, MovementType, ProductRecord};
use chrono::NaiveDate;
use std::collections::HashMap;

pub const PRODUCT_ID: &str = "ProductID";
pub const NAME: &str = "Name";
pub const QUANTITY: &str = "Quantity";

/// Column positions of the ledger fields, resolved by header name
#[derive(Debug, Clone, Copy)]
struct LedgerColumns {
    product_id: usize,
    name: usize,
    quantity: usize,
    daily: usize,
    last_date: usize,
}

impl LedgerColumns {
    fn resolve(table: &Table) -> Result<Self, InventoryError> {
        Ok(LedgerColumns {
            product_id: table.require_column(PRODUCT_ID)?,
            name: table.require_column(NAME)?,
            quantity: table.require_column(QUANTITY)?,
            daily: table.require_column(DAILY_TRANSACTIONS)?,
            last_date: table.require_column(LAST_TRANSACTION_DATE)?,
        })
    }
}

/// Result of applying a batch of movements
///
/// A batch never aborts early, so both variants mean every item was
/// attempted and every accepted item was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every item was applied
    Completed,

    /// Some items were rejected; the rest were applied
    CompletedWithErrors(Vec<InventoryError>),
}

impl BatchOutcome {
    fn from_errors(errors: Vec<InventoryError>) -> Self {
        if errors.is_empty() {
            BatchOutcome::Completed
        } else {
            BatchOutcome::CompletedWithErrors(errors)
        }
    }

    pub fn all_succeeded(&self) -> bool {
        matches!(self, BatchOutcome::Completed)
    }

    /// Per-item errors in the order they occurred
    pub fn errors(&self) -> &[InventoryError] {
        match self {
            BatchOutcome::Completed => &[],
            BatchOutcome::CompletedWithErrors(errors) => errors,
        }
    }
}

/// Typed, indexed access to an inventory ledger table
///
/// The ledger borrows the table for the duration of one request; mutations
/// are written straight into its cells so the caller can save it afterwards.
pub struct Ledger<'a> {
    table: &'a mut Table,
    columns: LedgerColumns,
    index: HashMap<String, usize>,
    today: NaiveDate,
    locale: Locale,
}

impl<'a> Ledger<'a> {
    /// Open a ledger over a loaded table
    ///
    /// # Arguments
    ///
    /// * `table` - Ledger table, normally already reconciled for `today`
    /// * `today` - Date stamped on every row touched
    /// * `locale` - Locale used to read text dates back out of the table
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Schema` if a ledger column is missing.
    pub fn open(table: &'a mut Table, today: NaiveDate, locale: Locale) -> Result<Self, InventoryError> {
        let columns = LedgerColumns::resolve(table)?;

        let mut index = HashMap::with_capacity(table.len());
        for row in 0..table.len() {
            let key = table.cell(row, columns.product_id).to_text();
            let key = key.trim();
            if !key.is_empty() {
                index.entry(key.to_string()).or_insert(row);
            }
        }

        Ok(Ledger {
            table,
            columns,
            index,
            today,
            locale,
        })
    }

    /// Number of distinct products in the ledger
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.index.contains_key(product_id.trim())
    }

    /// Current state of one product
    pub fn record(&self, product_id: &str) -> Option<ProductRecord> {
        self.index
            .get(product_id.trim())
            .map(|&row| self.read_record(row))
    }

    /// Every row of the table as a product record, in table order
    pub fn records(&self) -> Vec<ProductRecord> {
        (0..self.table.len()).map(|row| self.read_record(row)).collect()
    }

    fn read_record(&self, row: usize) -> ProductRecord {
        let cell = |column| self.table.cell(row, column);
        ProductRecord {
            product_id: cell(self.columns.product_id).to_text(),
            name: cell(self.columns.name).to_text(),
            quantity: cell(self.columns.quantity).as_i64().unwrap_or(0),
            daily_transactions: cell(self.columns.daily).as_i64().unwrap_or(0),
            last_transaction_date: parse_calendar_date(cell(self.columns.last_date), self.locale),
        }
    }

    fn write_counts(&mut self, row: usize, quantity: i64, daily: i64) {
        self.table
            .set_cell(row, self.columns.quantity, CellValue::Integer(quantity));
        self.table
            .set_cell(row, self.columns.daily, CellValue::Integer(daily));
        self.table
            .set_cell(row, self.columns.last_date, CellValue::Date(self.today));
    }

    /// Receive stock, creating the product if it is unknown
    ///
    /// Existing products get `quantity_delta` added to both their quantity
    /// and daily counter; their name is kept. Unknown products are appended
    /// with quantity and daily counter set to `quantity_delta`. There is no
    /// negative-stock check on this path.
    ///
    /// # Errors
    ///
    /// - `InventoryError::Validation` if `product_id` is blank
    /// - `InventoryError::ArithmeticOverflow` if a sum would overflow
    pub fn upsert(&mut self, product_id: &str, name: &str, quantity_delta: i64) -> Result<(), InventoryError> {
        let product_id = product_id.trim();
        if product_id.is_empty() {
            return Err(InventoryError::validation(None, "product ID is required"));
        }

        match self.index.get(product_id).copied() {
            Some(row) => {
                let current = self.read_record(row);
                let quantity = current
                    .quantity
                    .checked_add(quantity_delta)
                    .ok_or_else(|| InventoryError::arithmetic_overflow("upsert", product_id))?;
                let daily = current
                    .daily_transactions
                    .checked_add(quantity_delta)
                    .ok_or_else(|| InventoryError::arithmetic_overflow("upsert", product_id))?;
                self.write_counts(row, quantity, daily);
                tracing::info!(product = product_id, delta = quantity_delta, quantity, "updated product");
            }
            None => {
                let record = ProductRecord::received(product_id, name, quantity_delta, self.today);
                let mut row = self.table.blank_row();
                row[self.columns.product_id] = CellValue::from(record.product_id.as_str());
                row[self.columns.name] = CellValue::from(record.name.as_str());
                row[self.columns.quantity] = CellValue::Integer(record.quantity);
                row[self.columns.daily] = CellValue::Integer(record.daily_transactions);
                row[self.columns.last_date] = CellValue::Date(self.today);
                self.table.push_row(row);
                self.index.insert(record.product_id, self.table.len() - 1);
                tracing::info!(product = product_id, quantity = quantity_delta, "created product");
            }
        }

        Ok(())
    }

    /// Apply one inbound or outbound movement to an existing product
    ///
    /// # Arguments
    ///
    /// * `kind` - `Entree` (inbound) or `Sortie` (outbound)
    /// * `product_id` - Product to adjust
    /// * `amount` - Units moved, never negative
    ///
    /// # Errors
    ///
    /// - `InventoryError::Validation` for other movement kinds or a negative amount
    /// - `InventoryError::ProductNotFound` if the product is not in the ledger
    /// - `InventoryError::InsufficientStock` if an outbound movement exceeds the stock
    /// - `InventoryError::ArithmeticOverflow` if a sum would overflow
    ///
    /// The row is unchanged whenever an error is returned.
    pub fn apply_adjustment(
        &mut self,
        kind: &MovementType,
        product_id: &str,
        amount: i64,
    ) -> Result<(), InventoryError> {
        let product_id = product_id.trim();
        let outbound = match kind {
            MovementType::Entree => false,
            MovementType::Sortie => true,
            MovementType::Other(label) => {
                return Err(InventoryError::validation(
                    Some(product_id),
                    &format!("unsupported movement type '{}', expected Entree or Sortie", label),
                ))
            }
        };
        if amount < 0 {
            return Err(InventoryError::validation(
                Some(product_id),
                "quantity must not be negative",
            ));
        }

        let row = *self
            .index
            .get(product_id)
            .ok_or_else(|| InventoryError::product_not_found(product_id))?;
        let current = self.read_record(row);
        let overflow = || InventoryError::arithmetic_overflow(kind.as_str(), product_id);

        let (quantity, daily) = if outbound {
            let remaining = current.quantity.checked_sub(amount).ok_or_else(overflow)?;
            if remaining < 0 {
                return Err(InventoryError::insufficient_stock(
                    product_id,
                    current.quantity,
                    amount,
                ));
            }
            (
                remaining,
                current.daily_transactions.checked_sub(amount).ok_or_else(overflow)?,
            )
        } else {
            (
                current.quantity.checked_add(amount).ok_or_else(overflow)?,
                current.daily_transactions.checked_add(amount).ok_or_else(overflow)?,
            )
        };

        self.write_counts(row, quantity, daily);
        tracing::debug!(product = product_id, kind = %kind, amount, quantity, "applied adjustment");
        Ok(())
    }

    /// Validate and apply a batch of raw movement requests
    ///
    /// Items are processed in order and independently. A "product not found"
    /// error is dropped when an error for the same product is already in the
    /// batch's error list; every other error is kept.
    pub fn apply_batch(&mut self, requests: &[MovementRequest]) -> BatchOutcome {
        let mut errors: Vec<InventoryError> = Vec::new();

        for request in requests {
            let result = request
                .validate()
                .and_then(|m| self.apply_adjustment(&m.kind, &m.product, m.quantity));

            match result {
                Ok(()) => {}
                Err(InventoryError::ProductNotFound { product })
                    if errors.iter().any(|e| e.product() == Some(product.as_str())) =>
                {
                    tracing::debug!(%product, "suppressed repeated not-found error");
                }
                Err(e) => {
                    tracing::warn!(product = ?e.product(), error = %e, "adjustment rejected");
                    errors.push(e);
                }
            }
        }

        BatchOutcome::from_errors(errors)
    }
}
