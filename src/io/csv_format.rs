//! CSV format handling for tables and snapshot output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Decoding of CSV fields into typed cells
//! - Synchronous table reading and writing
//! - Inventory snapshot serialization
//!
//! The async store reuses the field-level helpers so both paths agree on
//! the on-disk layout.

use crate::io::table::{CellValue, Table, DATE_FORMAT};
use crate::types::{InventoryError, ProductRecord};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::io::{Read, Write};

/// Decode one CSV record into typed cells
pub fn decode_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Vec<CellValue> {
    fields.into_iter().map(CellValue::parse).collect()
}

/// Encode one row of cells into CSV fields
pub fn encode_row(row: &[CellValue]) -> Vec<String> {
    row.iter().map(CellValue::to_text).collect()
}

/// Read a whole table from CSV
///
/// The first record is the header row. Fields are trimmed and records may
/// have differing lengths.
///
/// # Arguments
///
/// * `name` - Logical table name, used in errors and kept on the table
/// * `reader` - Source of CSV data
///
/// # Errors
///
/// - `InventoryError::NotFound` if the input has no header row
/// - `InventoryError::Parse` if the CSV is malformed
/// - `InventoryError::Io` if reading fails
pub fn read_table<R: Read>(name: &str, reader: R) -> Result<Table, InventoryError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(InventoryError::not_found(name));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(decode_fields(record.iter()));
    }

    Ok(Table::from_parts(name, headers, rows))
}

/// Write a whole table as CSV, header row first
///
/// # Errors
///
/// Returns `InventoryError::Io` if writing or flushing fails.
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<(), InventoryError> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(encode_row(row))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write an inventory snapshot in CSV format
///
/// Writes records with columns: productId, name, quantity, dailyTransactions,
/// lastTransactionDate. Records are sorted by product ID for deterministic output.
///
/// # Arguments
///
/// * `records` - Slice of product records to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_snapshot_csv(records: &[ProductRecord], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record([
            "productId",
            "name",
            "quantity",
            "dailyTransactions",
            "lastTransactionDate",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.product_id.cmp(&b.product_id));

    for record in sorted {
        writer
            .write_record(&[
                record.product_id,
                record.name,
                record.quantity.to_string(),
                record.daily_transactions.to_string(),
                record
                    .last_transaction_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            ])
            .map_err(|e| format!("Failed to write product record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
