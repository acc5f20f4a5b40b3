//! Generic materialization of a raw result page.

use std::fmt;

use tabled::builder::Builder;

/// Tabular query results: named columns and positionally aligned rows.
/// Immutable after construction apart from caller-side column renaming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Build a table from a raw page. The first row supplies column names
    /// verbatim; every later row is aligned positionally to those columns,
    /// with absent cells padded with the empty string.
    ///
    /// No semantic renaming happens here; known query shapes rename their
    /// columns in the caller layer via [`ResultTable::rename_columns`].
    pub fn from_raw_page(raw: Vec<Vec<String>>) -> Self {
        let mut raw = raw.into_iter();
        let Some(columns) = raw.next() else {
            return Self::default();
        };
        let width = columns.len();
        let rows = raw
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace column names positionally. Extra names are ignored; columns
    /// past the end of `names` keep their original name.
    pub fn rename_columns(&mut self, names: &[&str]) {
        for (column, name) in self.columns.iter_mut().zip(names) {
            *column = (*name).to_string();
        }
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }
        write!(f, "{}", builder.build())
    }
}
