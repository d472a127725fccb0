//! Row filtering by column equality.
//!
//! Filter format:
//! ```text
//! dept=SALES;region=_west
//! ```
//!
//! Each `;`-separated piece is `column=value`, split on the first `=`, so
//! the value itself may contain `=`. The column is a header name or a `_N`
//! positional alias. Empty pieces are ignored.

use tracing::debug;

use crate::error::{PipelineError, Result, Stage};
use crate::row::{ColumnLookup, Row};
use crate::source::RowSource;

/// A single `row[column] == expected` test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: usize,
    pub expected: String,
}

impl Predicate {
    pub fn new(column: usize, expected: impl Into<String>) -> Self {
        Self {
            column,
            expected: expected.into(),
        }
    }

    /// A row too short to have the column never matches.
    pub fn matches(&self, row: &[String]) -> bool {
        row.get(self.column).is_some_and(|cell| *cell == self.expected)
    }
}

/// How predicate results fold into a pass/fail decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Every predicate must hold.
    #[default]
    And,
    /// At least one predicate must hold.
    Or,
}

impl Combinator {
    /// Fold all predicates over `row`. An empty list always passes.
    ///
    /// Every predicate is evaluated, there is no short-circuit.
    pub fn accepts(self, predicates: &[Predicate], row: &[String]) -> bool {
        if predicates.is_empty() {
            return true;
        }
        match self {
            Combinator::And => predicates.iter().fold(true, |acc, p| acc & p.matches(row)),
            Combinator::Or => predicates.iter().fold(false, |acc, p| acc | p.matches(row)),
        }
    }
}

/// Parse a `col=val;col=val` spec against the header.
///
/// Any unknown column fails the whole set.
pub fn parse_filters(spec: &str, lookup: &ColumnLookup) -> Result<Vec<Predicate>> {
    let mut predicates = Vec::new();
    for piece in spec.split(';') {
        if piece.is_empty() {
            continue;
        }
        let Some((name, value)) = piece.split_once('=') else {
            return Err(PipelineError::FilterParse(piece.to_string()));
        };
        let column = lookup
            .resolve(name)
            .ok_or_else(|| PipelineError::column_not_found(Stage::Filter, name))?;
        predicates.push(Predicate::new(column, value));
    }
    debug!(count = predicates.len(), "parsed filters");
    Ok(predicates)
}

/// Passes through only the rows accepted by the combinator.
pub struct FilterReader<S> {
    source: S,
    predicates: Vec<Predicate>,
    combinator: Combinator,
    row: Row,
    error: Option<PipelineError>,
    rejected: u64,
}

impl<S: RowSource> FilterReader<S> {
    pub fn new(source: S, predicates: Vec<Predicate>, combinator: Combinator) -> Self {
        Self {
            source,
            predicates,
            combinator,
            row: Row::new(),
            error: None,
            rejected: 0,
        }
    }

    /// Advance to the next accepted row.
    ///
    /// Returns `false` once the source is exhausted or fails; `error()`
    /// then tells the two apart.
    pub fn scan(&mut self) -> bool {
        match self.next_row() {
            Ok(Some(row)) => {
                self.row = row;
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    /// The row accepted by the last successful `scan()`.
    pub fn row(&self) -> &[String] {
        &self.row
    }

    /// The error that ended scanning, if any. Plain end of input is not an error.
    pub fn error(&self) -> Option<&PipelineError> {
        self.error.as_ref()
    }

    /// Take ownership of the terminal error.
    pub fn take_error(&mut self) -> Option<PipelineError> {
        self.error.take()
    }

    /// Rows read from upstream and rejected so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl<S: RowSource> RowSource for FilterReader<S> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        while let Some(row) = self.source.next_row()? {
            if self.combinator.accepts(&self.predicates, &row) {
                return Ok(Some(row));
            }
            self.rejected += 1;
        }
        Ok(None)
    }
}
