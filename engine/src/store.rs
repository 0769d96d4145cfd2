//! Row store adapter - the seam to the external spreadsheet-like store.
//!
//! The store is a set of named sheets. A sheet is a header row followed
//! by data rows; every cell holds an arbitrary JSON value. The adapter
//! exposes exactly the operations the backing store supports: open (with
//! lazy provisioning), full scan, append, single-cell write, row delete.
//! There are no transactions and no row locks - a logical record update
//! is several `set_cell` calls, and other writers may interleave between
//! any two of them.

use crate::{error::Result, CellValue, CollectionName, Error, SchemaRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A full scan of one sheet: the header row plus all data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    /// Column names, in storage order
    pub headers: Vec<String>,
    /// Data rows; each row is positional, aligned to `headers`
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Whether the sheet holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Adapter over the external row store.
///
/// Row indices are positions in the *current* scan: a `delete_row`
/// shifts every later row up one, so indices must never be cached
/// across calls.
pub trait RowStore {
    /// Ensure the sheet exists, creating it with a header row from the
    /// registry if absent.
    fn open(&mut self, name: &str, registry: &SchemaRegistry) -> Result<()>;

    /// Read the whole sheet. A missing sheet reads as empty, not an error.
    fn read_all(&self, name: &str) -> Result<Sheet>;

    /// Append one data row.
    fn append(&mut self, name: &str, values: Vec<CellValue>) -> Result<()>;

    /// Overwrite a single cell of data row `row` (0-based, headers excluded).
    fn set_cell(&mut self, name: &str, row: usize, col: usize, value: CellValue) -> Result<()>;

    /// Physically remove data row `row`; later rows shift up one position.
    fn delete_row(&mut self, name: &str, row: usize) -> Result<()>;
}

/// In-process row store.
///
/// Serializable so a host can snapshot it to disk and restore it on
/// startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStore {
    sheets: HashMap<CollectionName, Sheet>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sheets: HashMap::new(),
        }
    }

    /// Names of all provisioned sheets.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.get_mut(name)
    }
}

impl RowStore for MemoryStore {
    fn open(&mut self, name: &str, registry: &SchemaRegistry) -> Result<()> {
        if !self.sheets.contains_key(name) {
            self.sheets.insert(
                name.to_string(),
                Sheet {
                    headers: registry.columns_for(name),
                    rows: Vec::new(),
                },
            );
        }
        Ok(())
    }

    fn read_all(&self, name: &str) -> Result<Sheet> {
        Ok(self.sheets.get(name).cloned().unwrap_or_default())
    }

    fn append(&mut self, name: &str, values: Vec<CellValue>) -> Result<()> {
        let sheet = self.sheet_mut(name).ok_or_else(|| Error::RowOutOfRange {
            sheet: name.to_string(),
            row: 0,
        })?;
        sheet.rows.push(values);
        Ok(())
    }

    fn set_cell(&mut self, name: &str, row: usize, col: usize, value: CellValue) -> Result<()> {
        let out_of_range = || Error::RowOutOfRange {
            sheet: name.to_string(),
            row,
        };

        let sheet = self.sheet_mut(name).ok_or_else(out_of_range)?;
        let cells = sheet.rows.get_mut(row).ok_or_else(out_of_range)?;

        // Rows may be ragged if the schema grew after they were written.
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Null);
        }
        cells[col] = value;
        Ok(())
    }

    fn delete_row(&mut self, name: &str, row: usize) -> Result<()> {
        let sheet = self.sheet_mut(name).ok_or_else(|| Error::RowOutOfRange {
            sheet: name.to_string(),
            row,
        })?;

        if row >= sheet.rows.len() {
            return Err(Error::RowOutOfRange {
                sheet: name.to_string(),
                row,
            });
        }
        sheet.rows.remove(row);
        Ok(())
    }
}
