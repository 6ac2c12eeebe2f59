//! In-process barcode register
//!
//! Holds the last barcode received from a scanner so a client can pick it
//! up later. Only the most recent value is kept.

use crate::core::traits::BarcodeRegister;
use std::sync::{Mutex, PoisonError};

/// Process-local [`BarcodeRegister`] backed by a mutex
#[derive(Debug, Default)]
pub struct LatestBarcode {
    slot: Mutex<Option<String>>,
}

impl LatestBarcode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BarcodeRegister for LatestBarcode {
    fn set(&self, barcode: String) {
        tracing::info!(%barcode, "received barcode");
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(barcode);
    }

    fn latest(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) -> Option<String> {
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::info!(barcode = ?previous, "cleared barcode");
        previous
    }
}
