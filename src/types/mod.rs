//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `product`: Ledger product records
//! - `movement`: Movement kinds, requests and log entries
//! - `error`: Error types for the stock ledger

pub mod error;
pub mod movement;
pub mod product;

pub use error::InventoryError;
pub use movement::{Movement, MovementRequest, MovementType, TransactionLogEntry};
pub use product::{ProductId, ProductRecord};
