//! Asynchronous table stores
//!
//! [`AsyncStore`] is the async counterpart of [`Store`]: tables are loaded
//! and saved whole, addressed by their logical name. [`AsyncCsvStore`]
//! mirrors [`CsvStore`](crate::io::store::CsvStore) on top of `tokio::fs`
//! and `csv-async`. Both CSV stores share the file naming and cell encoding,
//! so they can be pointed at the same directory.
//!
//! # Architecture
//!
//! ```text
//! tokio::fs::File → compat layer → csv_async reader → typed cells → Table
//! Table → typed cells → csv_async writer → temp file → rename over target
//! ```
//!
//! Temp file creation and the final rename have no tokio counterpart and run
//! on the blocking pool.

use crate::io::csv_format::{decode_fields, encode_row};
use crate::io::memory_store::MemoryStore;
use crate::io::store::{table_file_name, Store};
use crate::io::table::Table;
use crate::types::InventoryError;
use async_trait::async_trait;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder, Trim};
use futures::stream::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

/// Async load/save access to named tables
#[async_trait]
pub trait AsyncStore: Send + Sync {
    /// Load a table by logical name
    ///
    /// # Errors
    ///
    /// - `InventoryError::NotFound` if the table does not exist
    /// - `InventoryError::Parse` / `InventoryError::Io` on read failures
    async fn load(&self, name: &str) -> Result<Table, InventoryError>;

    /// Replace the stored table with `table`, keyed by its name
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Io` if the table cannot be written. The
    /// previously stored table is left intact in that case.
    async fn save(&self, table: &Table) -> Result<(), InventoryError>;

    /// Create a table with just a header row if it does not exist yet
    ///
    /// Returns `true` if the table was created.
    async fn ensure(&self, name: &str, headers: &[&str]) -> Result<bool, InventoryError> {
        match self.load(name).await {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => {
                self.save(&Table::new(name, headers)).await?;
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}

/// Run a blocking filesystem call on the blocking pool
async fn blocking<T, F>(task: F) -> Result<T, InventoryError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| InventoryError::Io {
            message: format!("Blocking file task failed: {}", e),
        })
}

/// Directory of CSV files, accessed asynchronously
#[derive(Debug, Clone)]
pub struct AsyncCsvStore {
    dir: PathBuf,
}

impl AsyncCsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        AsyncCsvStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a logical table
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(table_file_name(name))
    }
}

#[async_trait]
impl AsyncStore for AsyncCsvStore {
    async fn load(&self, name: &str) -> Result<Table, InventoryError> {
        let path = self.path_for(name);
        let file = match tokio::fs::File::open(&path).await {
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

        let mut reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .create_reader(file.compat());

        let headers: Vec<String> = reader.headers().await?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(InventoryError::not_found(name));
        }

        let mut rows = Vec::new();
        let mut records = reader.records();
        while let Some(record) = records.next().await {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(decode_fields(record.iter()));
        }

        let table = Table::from_parts(name, headers, rows);
        tracing::debug!(table = name, rows = table.len(), path = %path.display(), "loaded table");
        Ok(table)
    }

    async fn save(&self, table: &Table) -> Result<(), InventoryError> {
        let path = self.path_for(table.name());
        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let (file, temp_path) = blocking(move || NamedTempFile::new_in(dir)).await??.into_parts();
        let file = tokio::fs::File::from_std(file);

        let mut writer = AsyncWriterBuilder::new()
            .flexible(true)
            .create_writer(file.compat_write());
        writer.write_record(table.headers()).await?;
        for row in table.rows() {
            writer.write_record(encode_row(row)).await?;
        }
        writer.flush().await?;

        let file = writer
            .into_inner()
            .await
            .map_err(|e| InventoryError::Io {
                message: format!("Failed to finish '{}': {}", path.display(), e),
            })?
            .into_inner();
        file.sync_all().await?;
        drop(file);

        let target = path.clone();
        blocking(move || temp_path.persist(target))
            .await?
            .map_err(|e| InventoryError::Io {
                message: format!("Failed to replace '{}': {}", path.display(), e.error),
            })?;

        tracing::debug!(table = table.name(), rows = table.len(), path = %path.display(), "saved table");
        Ok(())
    }
}

#[async_trait]
impl AsyncStore for MemoryStore {
    async fn load(&self, name: &str) -> Result<Table, InventoryError> {
        Store::load(self, name)
    }

    async fn save(&self, table: &Table) -> Result<(), InventoryError> {
        Store::save(self, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{CsvStore, INVENTORY_LEDGER, LEDGER_HEADERS};
    use crate::io::table::CellValue;
    use std::fs;
    use tempfile::TempDir;

    fn sample_ledger() -> Table {
        let mut table = Table::new(INVENTORY_LEDGER, &LEDGER_HEADERS);
        table.push_row(vec![
            CellValue::from("P1"),
            CellValue::from("Widget"),
            CellValue::Integer(10),
            CellValue::Integer(-4),
            CellValue::Text("Mon Oct 19 2026".to_string()),
        ]);
        table
    }

    #[tokio::test]
    async fn test_async_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = AsyncCsvStore::new(dir.path());

        assert!(store.load(INVENTORY_LEDGER).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_async_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = AsyncCsvStore::new(dir.path());
        let table = sample_ledger();

        store.save(&table).await.unwrap();
        assert_eq!(store.load(INVENTORY_LEDGER).await.unwrap(), table);
    }

    #[tokio::test]
    async fn test_async_save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let store = AsyncCsvStore::new(dir.path());

        store.save(&sample_ledger()).await.unwrap();
        store.save(&sample_ledger()).await.unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["inventory_ledger.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_async_and_sync_stores_share_layout() {
        let dir = TempDir::new().unwrap();
        let async_store = AsyncCsvStore::new(dir.path());
        let sync_store = CsvStore::new(dir.path());
        let table = sample_ledger();

        async_store.save(&table).await.unwrap();
        assert_eq!(Store::load(&sync_store, INVENTORY_LEDGER).unwrap(), table);
    }

    #[tokio::test]
    async fn test_async_ensure_creates_once() {
        let dir = TempDir::new().unwrap();
        let store = AsyncCsvStore::new(dir.path());

        assert!(store.ensure(INVENTORY_LEDGER, &LEDGER_HEADERS).await.unwrap());
        store.save(&sample_ledger()).await.unwrap();
        assert!(!store.ensure(INVENTORY_LEDGER, &LEDGER_HEADERS).await.unwrap());
        assert_eq!(store.load(INVENTORY_LEDGER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_serves_async_callers() {
        let store = MemoryStore::new();

        assert!(AsyncStore::ensure(&store, INVENTORY_LEDGER, &LEDGER_HEADERS).await.unwrap());
        AsyncStore::save(&store, &sample_ledger()).await.unwrap();
        assert_eq!(Store::load(&store, INVENTORY_LEDGER).unwrap(), sample_ledger());
    }
}
