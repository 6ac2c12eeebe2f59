//! Core traits for time and barcode state
//!
//! These abstractions keep ambient, process-wide state out of the ledger
//! logic: the current date is injected through a [`Clock`], and the last
//! scanned barcode lives behind a [`BarcodeRegister`].

use chrono::{NaiveDate, NaiveDateTime};

/// Source of the current local wall-clock time
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Single-slot, last-write-wins register for scanned barcodes
///
/// Starts empty. Implementations must be safe to share between threads.
pub trait BarcodeRegister: Send + Sync {
    /// Replace the stored barcode
    fn set(&self, barcode: String);

    /// Most recently stored barcode, if any
    fn latest(&self) -> Option<String>;

    /// Empty the register, returning what it held
    fn clear(&self) -> Option<String>;
}
