//! In-memory table model
//!
//! A [`Table`] is a named, header-addressed sequence of rows of typed cells.
//! Both the inventory ledger and the transaction log are tables; the ledger
//! engine and log recorder work on in-memory copies and hand them back to a
//! store for persistence.
//!
//! Columns are always resolved by header name, never by position, so that a
//! reordered header does not change the meaning of the data.

use crate::types::InventoryError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Layout used for native dates in storage
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Layout used for native times in storage
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Layout used for native timestamps in storage
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single table cell
///
/// Cells read from storage are typed by inspecting their text: canonical
/// integers, ISO dates, ISO times and ISO timestamps become native values,
/// everything else stays text. Native values are written back in the same
/// ISO layouts, so a native cell survives a save/load cycle unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Infer a typed cell from stored text
    ///
    /// Only canonical text becomes a native value: `"007"`, `"+5"`,
    /// `"2026-1-5"` and `"9:5:0"` stay text so identifiers and names keep
    /// their exact spelling.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(i) = raw.parse::<i64>() {
            if i.to_string() == raw {
                return CellValue::Integer(i);
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            if date.format(DATE_FORMAT).to_string() == raw {
                return CellValue::Date(date);
            }
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
            if ts.format(DATETIME_FORMAT).to_string() == raw {
                return CellValue::DateTime(ts);
            }
        }
        if let Ok(time) = NaiveTime::parse_from_str(raw, TIME_FORMAT) {
            if time.format(TIME_FORMAT).to_string() == raw {
                return CellValue::Time(time);
            }
        }

        CellValue::Text(raw.to_string())
    }

    /// Text form of the cell, as written to storage
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            CellValue::Time(t) => t.format(TIME_FORMAT).to_string(),
            CellValue::DateTime(ts) => ts.format(DATETIME_FORMAT).to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Read the cell as an integer
    ///
    /// Integers are returned as is; text is parsed after trimming. Anything
    /// else yields `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// Normalize a header for lookup: case-insensitive, ignoring spaces and underscores
fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A named table with a header row and data rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given headers
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Table {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Assemble a table from loaded parts
    ///
    /// Rows shorter than the header are padded with empty cells.
    pub fn from_parts(name: &str, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Table {
            name: name.to_string(),
            headers,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column with the given header name
    pub fn column(&self, name: &str) -> Option<usize> {
        let key = header_key(name);
        self.headers.iter().position(|h| header_key(h) == key)
    }

    /// Position of a column that must exist
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Schema` if the header has no such column.
    pub fn require_column(&self, name: &str) -> Result<usize, InventoryError> {
        self.column(name)
            .ok_or_else(|| InventoryError::missing_column(&self.name, name))
    }

    /// A row of empty cells matching the header width
    pub fn blank_row(&self) -> Vec<CellValue> {
        vec![CellValue::Empty; self.headers.len()]
    }

    /// Append a row, padding it to the header width
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        if row.len() < self.headers.len() {
            row.resize(self.headers.len(), CellValue::Empty);
        }
        self.rows.push(row);
    }

    /// Cell at `row`, `column`; out-of-range positions read as empty
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(EMPTY)
    }

    /// Overwrite the cell at `row`, `column`
    ///
    /// Rows are extended as needed; writes to a missing row are ignored.
    pub fn set_cell(&mut self, row: usize, column: usize, value: CellValue) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.len() <= column {
                r.resize(column + 1, CellValue::Empty);
            }
            r[column] = value;
        }
    }
}
