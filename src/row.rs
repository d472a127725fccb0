//! Rows and header name resolution.

use std::collections::HashMap;

/// One line of delimited input, one `String` per cell.
pub type Row = Vec<String>;

/// Maps header names and positional aliases (`_1`, `_2`, ...) to column indexes.
///
/// Built once per file from the header. When a name appears more than once,
/// the rightmost column wins. Aliases are 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLookup {
    indexes: HashMap<String, usize>,
}

impl ColumnLookup {
    pub fn new(header: &[String]) -> Self {
        let mut indexes = HashMap::with_capacity(header.len() * 2);
        for (i, name) in header.iter().enumerate() {
            indexes.insert(name.clone(), i);
            indexes.insert(format!("_{}", i + 1), i);
        }
        Self { indexes }
    }

    /// Resolve a column name or positional alias.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.indexes.get(name).copied()
    }
}

/// Build a row from string slices.
#[cfg(test)]
pub(crate) fn row_of(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}
