//! Labelled tables: gene-by-sample measurements, annotation-by-sample scores
//! and per-feature-set outputs all share one dense row-major shape.

pub mod align;
pub mod parse;

pub use align::{AlignedFrame, AnnotationTable, align};
pub use parse::{StringTable, TableFormat, read_numeric_table, read_string_table, write_table};

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Dense numeric table with string row and column labels. `None` marks a
/// missing value ("no data"), which is never the same as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Header of the index column, e.g. `gene_id` or `feature`.
    pub index_name: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `values[r][c]` is the cell at `rows[r]`, `columns[c]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl Table {
    /// Build a table, checking shape and label uniqueness.
    pub fn new(
        index_name: impl Into<String>,
        rows: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Table> {
        if values.len() != rows.len() {
            return Err(Error::Config(format!(
                "table has {} row labels but {} rows of values",
                rows.len(),
                values.len()
            )));
        }
        if let Some((i, r)) = values.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(Error::Config(format!(
                "row '{}' has {} values, expected {}",
                rows[i],
                r.len(),
                columns.len()
            )));
        }
        if let Some(dup) = first_duplicate(&columns) {
            return Err(Error::Config(format!("duplicate column '{}'", dup)));
        }
        if let Some(dup) = first_duplicate(&rows) {
            return Err(Error::Config(format!("duplicate row '{}'", dup)));
        }
        Ok(Table {
            index_name: index_name.into(),
            rows,
            columns,
            values,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self) -> HashMap<&str, usize> {
        self.columns.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect()
    }

    pub fn row_index(&self) -> HashMap<&str, usize> {
        self.rows.iter().enumerate().map(|(i, r)| (r.as_str(), i)).collect()
    }

    /// Look up a cell by labels.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        self.values[r][c]
    }

    /// Swap rows and columns. `index_name` becomes `new_index_name`.
    pub fn transpose(&self, new_index_name: impl Into<String>) -> Table {
        let values = (0..self.n_cols())
            .map(|c| self.values.iter().map(|row| row[c]).collect())
            .collect();
        Table {
            index_name: new_index_name.into(),
            rows: self.columns.clone(),
            columns: self.rows.clone(),
            values,
        }
    }
}

pub(crate) fn first_duplicate(labels: &[String]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    labels.iter().map(String::as_str).find(|l| !seen.insert(*l))
}
