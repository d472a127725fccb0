//! Row sources: the pull interface every pipeline stage implements.

use std::collections::VecDeque;
use std::io::Read;

use crate::error::Result;
use crate::row::Row;

/// Anything that can hand out rows one at a time.
///
/// `Ok(None)` marks the end of the stream. Wrapping stages (truncation,
/// column synthesis, filtering) both consume and implement this trait, so
/// they stack in any order.
pub trait RowSource {
    /// Pull the next row from upstream.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }
}

/// Reads comma-delimited records from any byte stream.
///
/// The header is not treated specially here; it is simply the first row.
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
    record: csv::StringRecord,
}

impl<R: Read> CsvSource<R> {
    pub fn new(input: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(input);
        Self {
            reader,
            record: csv::StringRecord::new(),
        }
    }
}

impl<R: Read> RowSource for CsvSource<R> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }
}

/// An in-memory source, handy for tests and for feeding pre-built rows.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    rows: VecDeque<Row>,
}

impl RowSource for MemorySource {
    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

/// Create a source that yields the given rows in order.
pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> MemorySource {
    MemorySource {
        rows: rows.into_iter().collect(),
    }
}

/// Count the data rows of a delimited stream, header excluded.
///
/// This is the pre-scan pass used by split mode. It consumes the reader.
pub fn count_data_rows<R: Read>(input: R) -> Result<u64> {
    let mut source = CsvSource::new(input);
    let mut total: u64 = 0;
    while source.next_row()?.is_some() {
        total += 1;
    }
    Ok(total.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::row_of;

    fn drain(source: &mut dyn RowSource) -> Vec<Row> {
        let mut rows = Vec::new();
        while let Some(row) = source.next_row().unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn test_csv_source_reads_all_rows() {
        let mut source = CsvSource::new("a,b\n1,2\n\"x,y\",3\n".as_bytes());
        let rows = drain(&mut source);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], row_of(&["a", "b"]));
        assert_eq!(rows[2], row_of(&["x,y", "3"]));
    }

    #[test]
    fn test_csv_source_rejects_ragged_rows() {
        let mut source = CsvSource::new("a,b\n1,2,3\n".as_bytes());
        assert!(source.next_row().unwrap().is_some());
        assert!(source.next_row().is_err());
    }

    #[test]
    fn test_memory_source_order() {
        let mut source = from_rows(vec![row_of(&["1"]), row_of(&["2"])]);
        assert_eq!(drain(&mut source), vec![row_of(&["1"]), row_of(&["2"])]);
        assert!(source.next_row().unwrap().is_none());
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut source: Box<dyn RowSource> = Box::new(from_rows(vec![row_of(&["only"])]));
        assert_eq!(source.next_row().unwrap(), Some(row_of(&["only"])));
        assert_eq!(source.next_row().unwrap(), None);
    }

    #[test]
    fn test_count_data_rows_excludes_header() {
        assert_eq!(count_data_rows("a,b\n1,2\n3,4\n".as_bytes()).unwrap(), 2);
        assert_eq!(count_data_rows("a,b\n".as_bytes()).unwrap(), 0);
        assert_eq!(count_data_rows("".as_bytes()).unwrap(), 0);
    }
}
