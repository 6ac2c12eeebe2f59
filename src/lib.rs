//! Stock Ledger Library
//! # Overview
//!
//! This library keeps a per-product inventory ledger and an append-only
//! transaction log in CSV tables, with a synchronous and an asynchronous
//! service strategy over the same files.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (ProductRecord, MovementRequest, InventoryError, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Applies stock movements to ledger rows
//!   - [`core::reconciler`] - Resets stale daily counters
//!   - [`core::transaction_log`] - Writes and reads transaction log rows
//!   - [`core::temporal`] - Date and time normalization across locales
//! - [`io`] - Table model, CSV encoding and table stores
//! - [`strategy`] - Inventory services and their runtime selection
//!
//! # Movement Types
//!
//! - **Entree**: Stock received; adds to quantity and the daily counter
//! - **Sortie**: Stock issued; subtracts from both, never below zero stock
//!
//! The transaction log stores `Entree` and `Sortie` under their canonical
//! spelling and any other label as given, trimmed.
//!
//! # Product Records
//!
//! Each ledger row maintains:
//! - `quantity`: Units currently in stock
//! - `dailyTransactions`: Signed sum of today's movements
//! - `lastTransactionDate`: Day the daily counter belongs to

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    reconcile, BarcodeRegister, BatchOutcome, Clock, FixedClock, LatestBarcode, Ledger, Locale,
    SystemClock, TransactionRecorder,
};
pub use crate::io::{AsyncCsvStore, AsyncStore, CsvStore, MemoryStore, Store, Table};
pub use crate::strategy::{AsyncInventoryService, InventoryConfig, InventoryService, InventoryStrategy};
pub use crate::types::{
    InventoryError, Movement, MovementRequest, MovementType, ProductId, ProductRecord,
    TransactionLogEntry,
};
