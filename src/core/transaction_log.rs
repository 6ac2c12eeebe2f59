//! Transaction log recorder
//!
//! Appends movements to the transactions log table and reads them back.
//! Each row stores the movement's date and time as separate text cells
//! formatted in the configured [`Locale`]; reading rebuilds a single
//! timestamp from them through the temporal module.

use crate::core::temporal::{reconstruct_timestamp, Locale};
use crate::io::table::{CellValue, Table};
use crate::types::{InventoryError, Movement, MovementRequest, MovementType, TransactionLogEntry};
use chrono::NaiveDateTime;

pub const TYPE: &str = "Type";
pub const DATE: &str = "Date";
pub const TIME: &str = "Time";
pub const PRODUCT: &str = "Product";
pub const QUANTITY: &str = "Quantity";

#[derive(Debug, Clone, Copy)]
struct LogColumns {
    kind: usize,
    date: usize,
    time: usize,
    product: usize,
    quantity: usize,
}

impl LogColumns {
    fn resolve(table: &Table) -> Result<Self, InventoryError> {
        Ok(LogColumns {
            kind: table.require_column(TYPE)?,
            date: table.require_column(DATE)?,
            time: table.require_column(TIME)?,
            product: table.require_column(PRODUCT)?,
            quantity: table.require_column(QUANTITY)?,
        })
    }
}

/// Writes and reads transaction log rows in one locale
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionRecorder {
    locale: Locale,
}

impl TransactionRecorder {
    pub fn new(locale: Locale) -> Self {
        TransactionRecorder { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Append one movement stamped with `at`
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Schema` if a log column is missing.
    pub fn append(
        &self,
        table: &mut Table,
        movement: &Movement,
        at: NaiveDateTime,
    ) -> Result<(), InventoryError> {
        let columns = LogColumns::resolve(table)?;

        let mut row = table.blank_row();
        row[columns.kind] = CellValue::from(movement.kind.as_str());
        row[columns.date] = CellValue::Text(self.locale.format_date(at.date()));
        row[columns.time] = CellValue::Text(self.locale.format_time(at.time()));
        row[columns.product] = CellValue::from(movement.product.as_str());
        row[columns.quantity] = CellValue::Integer(movement.quantity);
        table.push_row(row);

        tracing::info!(
            kind = %movement.kind,
            product = %movement.product,
            quantity = movement.quantity,
            "recorded transaction"
        );
        Ok(())
    }

    /// Every row of the log, in table order
    ///
    /// Rows whose date and time cannot be combined get `occurred_at = None`.
    /// A quantity cell that is not a whole number reads as 0.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Schema` if a log column is missing.
    pub fn read(&self, table: &Table) -> Result<Vec<TransactionLogEntry>, InventoryError> {
        let columns = LogColumns::resolve(table)?;

        let entries = (0..table.len())
            .map(|row| {
                let product = table.cell(row, columns.product).to_text();
                let quantity_cell = table.cell(row, columns.quantity);
                let quantity = quantity_cell.as_i64().unwrap_or_else(|| {
                    tracing::warn!(row, %product, value = %quantity_cell.to_text(), "unreadable log quantity");
                    0
                });

                TransactionLogEntry {
                    kind: MovementType::parse(&table.cell(row, columns.kind).to_text()),
                    product,
                    quantity,
                    occurred_at: reconstruct_timestamp(
                        table.cell(row, columns.date),
                        table.cell(row, columns.time),
                        self.locale,
                    ),
                }
            })
            .collect();

        Ok(entries)
    }
}

/// Split log requests into valid movements and a count of skipped ones
///
/// A request is skipped when its type or product is missing or its quantity
/// is not a whole number. Skipped requests are logged, never fatal. Any
/// movement label is accepted.
pub fn validate_log_entries(requests: &[MovementRequest]) -> (Vec<Movement>, usize) {
    let mut valid = Vec::with_capacity(requests.len());
    let mut skipped = 0;

    for (position, request) in requests.iter().enumerate() {
        match request.validate() {
            Ok(movement) => valid.push(movement),
            Err(e) => {
                tracing::warn!(position, error = %e, "skipping log entry");
                skipped += 1;
            }
        }
    }

    (valid, skipped)
}
