//! In-memory table of string rows under named columns.
//!
//! This module provides the [`Table`] type and its operations:
//! - Row insertion with shape validation
//! - Stable sorting on a single column
//! - Whole-row and column-scoped case-insensitive search
//! - Key-based update and delete
//! - CSV load/save (see [`csv`])

pub mod csv;
mod error;
mod search;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use error::{Result, TableError};
pub use search::SearchOutcome;

/// One record: an ordered sequence of field values.
pub type Row = Vec<String>;

/// Headers used when no configuration overrides them.
pub const DEFAULT_HEADERS: [&str; 3] = ["Reg No", "Name", "Course"];

/// A mutable, ordered collection of fixed-width string rows.
///
/// Every row has exactly as many fields as the table has headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

/// A copy of a table's headers and rows, handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from headers and rows, validating every row.
    pub fn with_rows(headers: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self {
            headers,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.insert(row)?;
        }
        Ok(table)
    }

    /// Column names, in order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows, in table order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Copy of headers and rows for display.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            headers: self.headers.clone(),
            rows: self.rows.clone(),
        }
    }

    /// Resolve a header name to its column index.
    ///
    /// Matching is exact first, then case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| {
                self.headers
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(name))
            })
    }

    /// First row whose field at `key_index` equals `key`.
    pub fn find(&self, key_index: usize, key: &str) -> Option<&Row> {
        self.position(key_index, key).map(|i| &self.rows[i])
    }

    /// Append a row at the end of the table.
    ///
    /// # Errors
    ///
    /// Returns `TableError::ShapeMismatch` if the row's length differs from
    /// the header count. The table is unchanged in that case.
    pub fn insert(&mut self, row: Row) -> Result<()> {
        self.check_shape(&row)?;
        trace!(fields = row.len(), "Inserting row");
        self.rows.push(row);
        Ok(())
    }

    /// Sort rows by the field at `column_index`.
    ///
    /// The sort is stable in both directions: rows with equal keys keep
    /// their relative order.
    pub fn sort_by_column(&mut self, column_index: usize, ascending: bool) -> Result<()> {
        self.check_column(column_index)?;
        debug!(column = column_index, ascending, rows = self.rows.len(), "Sorting table");
        self.rows.sort_by(|a, b| {
            let ord = a[column_index].cmp(&b[column_index]);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        Ok(())
    }

    /// Set `row[column_index] = new_value` on the first row keyed by `key`.
    ///
    /// # Errors
    ///
    /// - `TableError::IndexOutOfRange` if either index is outside the headers
    /// - `TableError::NotFound` if no row has `row[key_index] == key`
    pub fn update_entry(
        &mut self,
        key_index: usize,
        column_index: usize,
        key: &str,
        new_value: impl Into<String>,
    ) -> Result<()> {
        self.check_column(key_index)?;
        self.check_column(column_index)?;

        let pos = self
            .position(key_index, key)
            .ok_or_else(|| TableError::not_found(key_index, key))?;
        self.rows[pos][column_index] = new_value.into();
        debug!(key, column = column_index, "Entry updated");
        Ok(())
    }

    /// Remove the first row keyed by `key` and return it.
    pub fn delete_entry(&mut self, key_index: usize, key: &str) -> Result<Row> {
        self.check_column(key_index)?;

        let pos = self
            .position(key_index, key)
            .ok_or_else(|| TableError::not_found(key_index, key))?;
        debug!(key, "Entry deleted");
        Ok(self.rows.remove(pos))
    }

    /// Replace headers and rows wholesale.
    pub(crate) fn replace(&mut self, other: Table) {
        *self = other;
    }

    fn position(&self, key_index: usize, key: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.get(key_index).map(String::as_str) == Some(key))
    }

    fn check_shape(&self, row: &[String]) -> Result<()> {
        if row.len() == self.headers.len() {
            Ok(())
        } else {
            Err(TableError::ShapeMismatch {
                expected: self.headers.len(),
                found: row.len(),
            })
        }
    }

    fn check_column(&self, index: usize) -> Result<()> {
        if index < self.headers.len() {
            Ok(())
        } else {
            Err(TableError::IndexOutOfRange {
                index,
                len: self.headers.len(),
            })
        }
    }
}
