//! Core inventory logic
//!
//! - `traits` - Clock and barcode register abstractions
//! - `clock` - System and fixed clocks
//! - `barcode` - In-process barcode register
//! - `temporal` - Locale-aware date and time normalization
//! - `reconciler` - Daily counter reset pass
//! - `ledger` - Inventory ledger engine
//! - `transaction_log` - Transaction log recorder

pub mod barcode;
pub mod clock;
pub mod ledger;
pub mod reconciler;
pub mod temporal;
pub mod traits;
pub mod transaction_log;

pub use barcode::LatestBarcode;
pub use clock::{FixedClock, SystemClock};
pub use ledger::{BatchOutcome, Ledger};
pub use reconciler::reconcile;
pub use temporal::Locale;
pub use traits::{BarcodeRegister, Clock};
pub use transaction_log::{validate_log_entries, TransactionRecorder};
