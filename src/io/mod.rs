//! I/O module
//!
//! Handles table modelling, CSV encoding and persistence.
//!
//! # Components
//!
//! - `table` - In-memory table model with typed cells
//! - `csv_format` - CSV format handling (cell encoding, table read/write, snapshot output)
//! - `store` - `Store` trait and the synchronous CSV directory store
//! - `memory_store` - In-process store
//! - `async_store` - `AsyncStore` trait and the asynchronous CSV directory store

pub mod async_store;
pub mod csv_format;
pub mod memory_store;
pub mod store;
pub mod table;

pub use async_store::{AsyncCsvStore, AsyncStore};
pub use csv_format::{read_table, write_snapshot_csv, write_table};
pub use memory_store::MemoryStore;
pub use store::{
    table_file_name, CsvStore, Store, INVENTORY_LEDGER, LEDGER_HEADERS, LOG_HEADERS,
    TRANSACTIONS_LOG,
};
pub use table::{CellValue, Table};
