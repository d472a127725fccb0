//! Column projection: keep a subset of columns in their original order.

use crate::error::{PipelineError, Result, Stage};
use crate::row::{ColumnLookup, Row};

/// One keep/drop flag per header column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionMask {
    enabled: Vec<bool>,
}

impl ProjectionMask {
    /// Keep every column of a `width`-column header.
    pub fn all(width: usize) -> Self {
        Self {
            enabled: vec![true; width],
        }
    }

    /// Build a mask from a `col;col` spec. Empty spec keeps everything.
    ///
    /// Selection order does not reorder output; columns always come out in
    /// header order. Every piece is looked up, including empty ones, so a
    /// stray `;` fails unless the header really has an empty-named column.
    pub fn build(spec: &str, lookup: &ColumnLookup, width: usize) -> Result<Self> {
        if spec.is_empty() {
            return Ok(Self::all(width));
        }
        let mut enabled = vec![false; width];
        for name in spec.split(';') {
            let index = lookup
                .resolve(name)
                .ok_or_else(|| PipelineError::column_not_found(Stage::Projection, name))?;
            if let Some(flag) = enabled.get_mut(index) {
                *flag = true;
            }
        }
        Ok(Self { enabled })
    }

    pub fn is_enabled(&self, column: usize) -> bool {
        self.enabled.get(column).copied().unwrap_or(false)
    }

    /// True when the mask would return rows unchanged.
    pub fn keeps_all(&self) -> bool {
        self.enabled.iter().all(|&e| e)
    }

    /// Keep enabled cells. Cells beyond the header width are dropped.
    pub fn project(&self, row: &[String]) -> Row {
        row.iter()
            .enumerate()
            .filter(|(i, _)| self.is_enabled(*i))
            .map(|(_, cell)| cell.clone())
            .collect()
    }
}
