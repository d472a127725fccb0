//! Line-range truncation, the first stage after the raw source.

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::row::Row;
use crate::source::RowSource;

/// Inclusive, 1-based line range counted after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u64,
    /// Last line to read. `None` reads to the end of input.
    pub stop: Option<u64>,
}

impl LineRange {
    pub const ALL: LineRange = LineRange {
        start: 1,
        stop: None,
    };

    pub fn new(start: u64, stop: Option<u64>) -> Self {
        Self { start, stop }
    }

    /// Build a range from command-line style bounds, where `end <= 0` means unbounded.
    pub fn from_flags(start: u64, end: i64) -> Self {
        let stop = u64::try_from(end).ok().filter(|&e| e > 0);
        Self { start, stop }
    }
}

impl Default for LineRange {
    fn default() -> Self {
        Self::ALL
    }
}

/// Skips rows before `range.start` and stops after `range.stop`.
pub struct TruncatingReader<S> {
    source: S,
    /// Line number of the next row to hand out.
    line: u64,
    stop: Option<u64>,
}

impl<S: RowSource> TruncatingReader<S> {
    /// Read the header, discard `start - 1` rows, and return both.
    ///
    /// The header is returned whatever the range is. Running out of rows
    /// while discarding is `PrematureEndOfStream`.
    pub fn open(mut source: S, range: LineRange) -> Result<(Row, Self)> {
        let header = match source.next_row() {
            Ok(Some(header)) => header,
            Ok(None) => return Err(PipelineError::EmptyInput),
            Err(e) => return Err(PipelineError::HeaderRead(Box::new(e))),
        };

        let start = range.start.max(1);
        for discarded in 0..start - 1 {
            if source.next_row()?.is_none() {
                return Err(PipelineError::PrematureEndOfStream {
                    start,
                    available: discarded,
                });
            }
        }
        debug!(start, stop = ?range.stop, "truncating reader positioned");

        Ok((
            header,
            Self {
                source,
                line: start,
                stop: range.stop,
            },
        ))
    }

    /// Line number (1-based, header excluded) of the next row to be read.
    pub fn line(&self) -> u64 {
        self.line
    }
}

impl<S: RowSource> RowSource for TruncatingReader<S> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        if let Some(stop) = self.stop
            && self.line > stop
        {
            return Ok(None);
        }
        let row = self.source.next_row()?;
        if row.is_some() {
            self.line += 1;
        }
        Ok(row)
    }
}
