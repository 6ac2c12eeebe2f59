//! Error types for the stock ledger
//!
//! This module defines every error that can surface from table storage,
//! ledger adjustments and log recording.
//!
//! # Error Categories
//!
//! - **Storage Errors**: missing tables, I/O failures, malformed CSV, missing columns
//! - **Item Errors**: validation failures, insufficient stock, unknown products.
//!   These are scoped to one batch item and never abort the batch.
//! - **Arithmetic Errors**: overflow in quantity or counter updates

use thiserror::Error;

/// Main error type for the stock ledger
///
/// Item-scoped variants carry the product key they refer to so that batch
/// processing can deduplicate "not found" reports per product.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    /// The table file (or its header row) does not exist
    ///
    /// Read paths treat this as empty data rather than a failure.
    #[error("Table not found: {table}")]
    NotFound {
        /// Logical name of the missing table
        table: String,
    },

    /// I/O error while reading or writing a table
    ///
    /// Fatal for the whole request.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// The table file is not valid CSV
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A required column is missing from a table header
    #[error("Table '{table}' has no '{column}' column")]
    Schema {
        /// Logical table name
        table: String,
        /// Name of the missing column
        column: String,
    },

    /// Malformed request payload
    ///
    /// Batch-item-scoped: the item is skipped and the batch continues.
    #[error("Invalid request{}: {message}", product.as_ref().map(|p| format!(" for product '{}'", p)).unwrap_or_default())]
    Validation {
        /// Product key of the offending item, when one was supplied
        product: Option<String>,
        /// What was wrong with the request
        message: String,
    },

    /// An outbound adjustment would drive stock below zero
    ///
    /// The product row is left unchanged.
    #[error("Insufficient quantity for product {product}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product ID
        product: String,
        /// Quantity in stock
        available: i64,
        /// Quantity requested for removal
        requested: i64,
    },

    /// An adjustment targets a product that is not in the ledger
    #[error("Product with ID '{product}' not found in inventory")]
    ProductNotFound {
        /// Product ID that was not found
        product: String,
    },

    /// Quantity or daily counter arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for product {product}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Product ID
        product: String,
    },
}

impl From<std::io::Error> for InventoryError {
    fn from(error: std::io::Error) -> Self {
        InventoryError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for InventoryError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            return InventoryError::Io {
                message: error.to_string(),
            };
        }

        InventoryError::Parse {
            line: error.position().map(|pos| pos.line()),
            message: error.to_string(),
        }
    }
}

impl From<csv_async::Error> for InventoryError {
    fn from(error: csv_async::Error) -> Self {
        if error.is_io_error() {
            return InventoryError::Io {
                message: error.to_string(),
            };
        }

        InventoryError::Parse {
            line: error.position().map(|pos| pos.line()),
            message: error.to_string(),
        }
    }
}

impl InventoryError {
    /// Create a NotFound error
    pub fn not_found(table: &str) -> Self {
        InventoryError::NotFound {
            table: table.to_string(),
        }
    }

    /// Create a Schema error
    pub fn missing_column(table: &str, column: &str) -> Self {
        InventoryError::Schema {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// Create a Validation error
    pub fn validation(product: Option<&str>, message: &str) -> Self {
        InventoryError::Validation {
            product: product.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// Create an InsufficientStock error
    pub fn insufficient_stock(product: &str, available: i64, requested: i64) -> Self {
        InventoryError::InsufficientStock {
            product: product.to_string(),
            available,
            requested,
        }
    }

    /// Create a ProductNotFound error
    pub fn product_not_found(product: &str) -> Self {
        InventoryError::ProductNotFound {
            product: product.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, product: &str) -> Self {
        InventoryError::ArithmeticOverflow {
            operation: operation.to_string(),
            product: product.to_string(),
        }
    }

    /// Product key this error is scoped to, if any
    ///
    /// Used to deduplicate per-product errors inside a batch.
    pub fn product(&self) -> Option<&str> {
        match self {
            InventoryError::Validation { product, .. } => product.as_deref(),
            InventoryError::InsufficientStock { product, .. }
            | InventoryError::ProductNotFound { product }
            | InventoryError::ArithmeticOverflow { product, .. } => Some(product),
            InventoryError::NotFound { .. }
            | InventoryError::Io { .. }
            | InventoryError::Parse { .. }
            | InventoryError::Schema { .. } => None,
        }
    }

    /// Whether this error means "no data" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::NotFound { .. })
    }
}
