//! Product-related types for the stock ledger
//!
//! This module defines the ProductRecord structure, the typed view of one
//! row of the inventory ledger table.

use chrono::NaiveDate;
use serde::Serialize;

/// Product identifier
///
/// Kept as text: identifiers such as `007` must survive round trips unchanged.
pub type ProductId = String;

/// Stock state of one product
///
/// Represents the current stock level of a product together with its
/// rolling daily transaction counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Unique key within the ledger table
    pub product_id: ProductId,

    /// Display label (not required to be unique)
    pub name: String,

    /// Current stock level
    ///
    /// Outbound adjustments that would drive it negative are rejected before
    /// mutation. Upserts may take it below zero.
    pub quantity: i64,

    /// Net signed count of units moved today
    ///
    /// Increased by inbound adjustments, decreased by outbound ones, and
    /// reset to zero by reconciliation when the last transaction date is not today.
    pub daily_transactions: i64,

    /// Date of the most recent adjustment or reconciliation touch
    ///
    /// `None` only when the stored cell could not be read as a date.
    pub last_transaction_date: Option<NaiveDate>,
}

impl ProductRecord {
    /// Create the record for a product first received today
    ///
    /// # Arguments
    ///
    /// * `product_id` - Key of the new product
    /// * `name` - Display label
    /// * `quantity` - Units received; also seeds the daily counter
    /// * `today` - Current calendar date
    pub fn received(product_id: &str, name: &str, quantity: i64, today: NaiveDate) -> Self {
        ProductRecord {
            product_id: product_id.to_string(),
            name: name.to_string(),
            quantity,
            daily_transactions: quantity,
            last_transaction_date: Some(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_received_seeds_daily_counter() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let record = ProductRecord::received("P1", "Widget", 5, today);

        assert_eq!(record.quantity, 5);
        assert_eq!(record.daily_transactions, 5);
        assert_eq!(record.last_transaction_date, Some(today));
    }

    #[test]
    fn test_serializes_camel_case() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let record = ProductRecord::received("P1", "Widget", 5, today);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"productId":"P1","name":"Widget","quantity":5,"dailyTransactions":5,"lastTransactionDate":"2026-10-19"}"#
        );
    }
}
