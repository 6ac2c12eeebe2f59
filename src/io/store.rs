//! Table persistence
//!
//! The [`Store`] trait is the only thing the services know about persistence:
//! tables are loaded and saved whole, addressed by their logical name. The
//! ledger logic never sees a path, so the backing medium can change without
//! touching it.
//!
//! [`CsvStore`] keeps one CSV file per table in a directory. Saves go to a
//! temporary file in the same directory which is then renamed over the
//! target, so a concurrent reader sees either the old or the new table and
//! never a partial one.

use crate::io::csv_format::{read_table, write_table};
use crate::io::table::Table;
use crate::types::InventoryError;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Logical name of the transaction log table
pub const TRANSACTIONS_LOG: &str = "Transactions log";
/// Logical name of the inventory ledger table
pub const INVENTORY_LEDGER: &str = "Inventory ledger";

/// Header row of the transaction log
pub const LOG_HEADERS: [&str; 5] = ["Type", "Date", "Time", "Product", "Quantity"];
/// Header row of the inventory ledger
pub const LEDGER_HEADERS: [&str; 5] = [
    "ProductID",
    "Name",
    "Quantity",
    "DailyTransactions",
    "LastTransactionDate",
];

/// Load/save access to named tables
pub trait Store: Send + Sync {
    /// Load a table by logical name
    ///
    /// # Errors
    ///
    /// - `InventoryError::NotFound` if the table does not exist
    /// - `InventoryError::Parse` / `InventoryError::Io` on read failures
    fn load(&self, name: &str) -> Result<Table, InventoryError>;

    /// Replace the stored table with `table`, keyed by its name
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Io` if the table cannot be written. The
    /// previously stored table is left intact in that case.
    fn save(&self, table: &Table) -> Result<(), InventoryError>;

    /// Create a table with just a header row if it does not exist yet
    ///
    /// Returns `true` if the table was created.
    fn ensure(&self, name: &str, headers: &[&str]) -> Result<bool, InventoryError> {
        match self.load(name) {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => {
                self.save(&Table::new(name, headers))?;
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}

/// File name used for a logical table name
///
/// Lowercases the name and replaces every run of non-alphanumeric
/// characters with a single underscore: `"Transactions log"` becomes
/// `transactions_log.csv`.
pub fn table_file_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    format!("{}.csv", slug.trim_matches('_'))
}

/// Directory of CSV files, one per table
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a logical table
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(table_file_name(name))
    }
}

impl Store for CsvStore {
    fn load(&self, name: &str) -> Result<Table, InventoryError> {
        let path = self.path_for(name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(InventoryError::not_found(name))
            }
            Err(e) => {
                return Err(InventoryError::Io {
                    message: format!("Failed to open '{}': {}", path.display(), e),
                })
            }
        };

        let table = read_table(name, BufReader::new(file))?;
        tracing::debug!(table = name, rows = table.len(), path = %path.display(), "loaded table");
        Ok(table)
    }

    fn save(&self, table: &Table) -> Result<(), InventoryError> {
        let path = self.path_for(table.name());
        fs::create_dir_all(&self.dir)?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            write_table(table, &mut writer)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| InventoryError::Io {
            message: format!("Failed to replace '{}': {}", path.display(), e.error),
        })?;

        tracing::debug!(table = table.name(), rows = table.len(), path = %path.display(), "saved table");
        Ok(())
    }
}
