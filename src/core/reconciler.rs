//! Daily counter reconciliation
//!
//! Each ledger row carries a daily transaction counter that is only
//! meaningful for the day in its `LastTransactionDate` column. Before any
//! adjustment is applied, rows whose date is not today get their counter
//! zeroed and their date moved to today, so counters are never stale.
//!
//! The pass is idempotent: a second run on the same day finds every date
//! equal to today and changes nothing.

use crate::core::temporal::{parse_calendar_date, Locale};
use crate::io::table::{CellValue, Table};
use crate::types::InventoryError;
use chrono::NaiveDate;

pub const DAILY_TRANSACTIONS: &str = "DailyTransactions";
pub const LAST_TRANSACTION_DATE: &str = "LastTransactionDate";

/// Reset stale daily counters in a ledger table
///
/// Dates are read permissively (see [`parse_calendar_date`]); a cell that
/// cannot be read as a date counts as "not today".
///
/// # Arguments
///
/// * `table` - Ledger table to reconcile in place
/// * `today` - Current calendar date, injected by the caller
/// * `locale` - Locale used to read text dates
///
/// # Returns
///
/// Number of rows that were reset.
///
/// # Errors
///
/// Returns `InventoryError::Schema` if the counter or date column is missing.
pub fn reconcile(table: &mut Table, today: NaiveDate, locale: Locale) -> Result<usize, InventoryError> {
    let daily_col = table.require_column(DAILY_TRANSACTIONS)?;
    let date_col = table.require_column(LAST_TRANSACTION_DATE)?;

    let mut reset = 0;
    for row in 0..table.len() {
        if parse_calendar_date(table.cell(row, date_col), locale) == Some(today) {
            continue;
        }
        table.set_cell(row, daily_col, CellValue::Integer(0));
        table.set_cell(row, date_col, CellValue::Date(today));
        reset += 1;
    }

    if reset > 0 {
        tracing::debug!(table = table.name(), rows = reset, %today, "reset daily counters");
    }
    Ok(reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{INVENTORY_LEDGER, LEDGER_HEADERS};
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn ledger_with(date: CellValue, daily: i64) -> Table {
        let mut table = Table::new(INVENTORY_LEDGER, &LEDGER_HEADERS);
        table.push_row(vec![
            CellValue::from("P1"),
            CellValue::from("Widget"),
            CellValue::Integer(10),
            CellValue::Integer(daily),
            date,
        ]);
        table
    }

    #[rstest]
    #[case::yesterday(CellValue::Date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()))]
    #[case::last_year(CellValue::Date(NaiveDate::from_ymd_opt(2025, 10, 19).unwrap()))]
    #[case::legacy_text(CellValue::Text("Sun Oct 18 2026".to_string()))]
    #[case::unreadable(CellValue::Text("someday".to_string()))]
    #[case::empty(CellValue::Empty)]
    fn test_stale_rows_are_reset(#[case] date: CellValue) {
        let mut table = ledger_with(date, 7);

        assert_eq!(reconcile(&mut table, today(), Locale::EnUs).unwrap(), 1);
        assert_eq!(table.cell(0, 3), &CellValue::Integer(0));
        assert_eq!(table.cell(0, 4), &CellValue::Date(today()));
        assert_eq!(table.cell(0, 2), &CellValue::Integer(10));
    }

    #[rstest]
    #[case::native(CellValue::Date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()))]
    #[case::legacy_text(CellValue::Text("Mon Oct 19 2026".to_string()))]
    #[case::locale_text(CellValue::Text("10/19/2026".to_string()))]
    fn test_rows_from_today_are_untouched(#[case] date: CellValue) {
        let mut table = ledger_with(date.clone(), -3);

        assert_eq!(reconcile(&mut table, today(), Locale::EnUs).unwrap(), 0);
        assert_eq!(table.cell(0, 3), &CellValue::Integer(-3));
        assert_eq!(table.cell(0, 4), &date);
    }

    #[test]
    fn test_second_run_same_day_is_a_no_op() {
        let mut table = ledger_with(CellValue::Text("Sun Oct 18 2026".to_string()), 5);
        reconcile(&mut table, today(), Locale::EnUs).unwrap();
        let after_first = table.clone();

        assert_eq!(reconcile(&mut table, today(), Locale::EnUs).unwrap(), 0);
        assert_eq!(table, after_first);
    }

    #[test]
    fn test_resets_every_stale_row_regardless_of_value() {
        let mut table = Table::new(INVENTORY_LEDGER, &LEDGER_HEADERS);
        for daily in [-5, 0, 12] {
            table.push_row(vec![
                CellValue::from("P"),
                CellValue::from("N"),
                CellValue::Integer(1),
                CellValue::Integer(daily),
                CellValue::Date(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            ]);
        }

        assert_eq!(reconcile(&mut table, today(), Locale::Iso).unwrap(), 3);
        assert!(table.rows().iter().all(|row| row[3] == CellValue::Integer(0)));
    }

    #[test]
    fn test_empty_ledger() {
        let mut table = Table::new(INVENTORY_LEDGER, &LEDGER_HEADERS);
        assert_eq!(reconcile(&mut table, today(), Locale::EnUs).unwrap(), 0);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let mut table = Table::new(INVENTORY_LEDGER, &["ProductID", "Name", "Quantity"]);
        let error = reconcile(&mut table, today(), Locale::EnUs).unwrap_err();

        assert_eq!(
            error,
            InventoryError::missing_column(INVENTORY_LEDGER, DAILY_TRANSACTIONS)
        );
    }

    #[test]
    fn test_spaced_header_spelling_is_accepted() {
        let mut table = Table::new(
            INVENTORY_LEDGER,
            &["ProductID", "Name", "Quantity", "Daily Transactions", "Last Transaction Date"],
        );
        table.push_row(vec![
            CellValue::from("P1"),
            CellValue::from("Widget"),
            CellValue::Integer(1),
            CellValue::Integer(4),
            CellValue::Empty,
        ]);

        assert_eq!(reconcile(&mut table, today(), Locale::EnUs).unwrap(), 1);
    }
}
