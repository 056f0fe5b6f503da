//! CSV tables passed between stages. Every table has an `INDEX` key
//! column first; row order is significant and preserved.

pub mod reader;
pub mod writer;

pub use reader::{read_table, read_vectors};
pub use writer::{vector_columns, write_table, write_vectors};

/// Name of the key column shared by all pipeline tables.
pub const INDEX_COLUMN: &str = "INDEX";

/// A string-valued table keyed by record id (the unified database table,
/// the SMILES table, the token table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedTable {
    columns: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

impl KeyedTable {
    /// `columns` are the value columns, excluding the key column.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. Returns `false` when the cell count does not match
    /// the column count.
    pub fn push(&mut self, key: String, cells: Vec<String>) -> bool {
        if cells.len() != self.columns.len() {
            return false;
        }
        self.rows.push((key, cells));
        true
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[(String, Vec<String>)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Keeps only rows whose key satisfies the predicate, preserving order.
    pub fn retain_keys<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.rows.retain(|(key, _)| keep(key));
    }
}
