//! Output writers: raw CSV, or a fixed-width table for humans.

use std::io::Write;

use crate::error::{PipelineError, Result};

/// Narrowest and widest table column, padding included.
pub const MIN_WIDTH: usize = 5;
pub const MAX_WIDTH: usize = 10;

const ELLIPSIS: &str = "...";
const BOM: char = '\u{feff}';

/// Destination for rendered rows.
///
/// The driver calls `flush()` once a file is done and `reset()` before the
/// next file starts, so per-file state never leaks between files.
pub trait RowWriter {
    fn write_row(&mut self, row: &[String]) -> Result<()>;

    /// Push any buffered output to the underlying stream.
    fn flush(&mut self) -> Result<()>;

    /// Forget per-file layout state.
    fn reset(&mut self) {}
}

impl<W: RowWriter + ?Sized> RowWriter for Box<W> {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        (**self).write_row(row)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Writes rows back out as comma-delimited text.
pub struct RawWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RawWriter<W> {
    pub fn new(output: W) -> Self {
        // Files processed in one run may have different widths.
        let writer = csv::WriterBuilder::new().flexible(true).from_writer(output);
        Self { writer }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }
}

impl<W: Write> RowWriter for RawWriter<W> {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.writer.write_record(row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Renders rows as fixed-width columns.
///
/// Widths come from the first row written after construction or `reset()`
/// (normally the header) and stay frozen until the next reset.
pub struct TableWriter<W: Write> {
    output: W,
    widths: Vec<usize>,
}

impl<W: Write> TableWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            widths: Vec::new(),
        }
    }

    /// The frozen width table, empty until the first row is written.
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

/// Strip byte-order marks and surrounding whitespace.
pub fn clean_cell(cell: &str) -> &str {
    cell.trim_matches(BOM).trim()
}

/// Display width for a column whose first cell is `cell`.
pub fn column_width(cell: &str) -> usize {
    (cell.chars().count() + 2).clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Fit `cell` into exactly `width` characters.
pub fn fit_cell(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    if len > width {
        let mut fitted: String = cell.chars().take(width.saturating_sub(ELLIPSIS.len())).collect();
        fitted.push_str(ELLIPSIS);
        fitted
    } else {
        let mut fitted = String::with_capacity(cell.len() + width - len);
        fitted.push_str(cell);
        fitted.extend(std::iter::repeat_n(' ', width - len));
        fitted
    }
}

impl<W: Write> RowWriter for TableWriter<W> {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        let cells: Vec<&str> = row.iter().map(|c| clean_cell(c)).collect();
        // A row wider than the frozen table grows it; existing widths never change.
        for cell in cells.iter().skip(self.widths.len()) {
            self.widths.push(column_width(cell));
        }

        let mut line = String::new();
        for (cell, &width) in cells.iter().zip(&self.widths) {
            line.push_str(&fit_cell(cell, width));
            line.push(' ');
        }
        line.push('\n');
        self.output.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    fn reset(&mut self) {
        self.widths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::row_of;

    fn table_output(rows: &[Vec<String>]) -> String {
        let mut writer = TableWriter::new(Vec::new());
        for row in rows {
            writer.write_row(row).unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_column_width_clamped() {
        assert_eq!(column_width(""), 5);
        assert_eq!(column_width("ab"), 5);
        assert_eq!(column_width("abcd"), 6);
        assert_eq!(column_width("abcdefgh"), 10);
        assert_eq!(column_width("a very long header"), 10);
    }

    #[test]
    fn test_fit_cell_pads_and_truncates() {
        assert_eq!(fit_cell("ab", 5), "ab   ");
        assert_eq!(fit_cell("abcde", 5), "abcde");
        assert_eq!(fit_cell("abcdef", 5), "ab...");
        assert_eq!(fit_cell("éééééé", 5), "éé...");
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("\u{feff}name "), "name");
        assert_eq!(clean_cell("  x\t"), "x");
    }

    #[test]
    fn test_table_layout() {
        let out = table_output(&[row_of(&["a", "name"]), row_of(&["1", "Alexandria"])]);
        assert_eq!(out, "a     name   \n1     Ale... \n");
    }

    #[test]
    fn test_table_widths_frozen_after_first_row() {
        let mut writer = TableWriter::new(Vec::new());
        writer.write_row(&row_of(&["id"])).unwrap();
        writer.write_row(&row_of(&["123456789"])).unwrap();
        assert_eq!(writer.widths(), &[5]);
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "id    \n12... \n");
    }

    #[test]
    fn test_reset_recomputes_widths() {
        let mut writer = TableWriter::new(Vec::new());
        writer.write_row(&row_of(&["a_long_header"])).unwrap();
        assert_eq!(writer.widths(), &[10]);
        writer.flush().unwrap();
        writer.reset();
        writer.write_row(&row_of(&["b"])).unwrap();
        assert_eq!(writer.widths(), &[5]);
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "a_long_... \nb     \n");
    }

    #[test]
    fn test_wider_row_extends_table() {
        let out = table_output(&[row_of(&["a"]), row_of(&["1", "extra"])]);
        assert_eq!(out, "a     \n1     extra   \n");
    }

    #[test]
    fn test_raw_writer_quotes_and_mixed_widths() {
        let mut writer = RawWriter::new(Vec::new());
        writer.write_row(&row_of(&["a", "b,c"])).unwrap();
        writer.reset();
        writer.write_row(&row_of(&["1"])).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, "a,\"b,c\"\n1\n");
    }

    #[test]
    fn test_boxed_writer() {
        let mut writer: Box<dyn RowWriter> = Box::new(TableWriter::new(std::io::sink()));
        writer.write_row(&row_of(&["x"])).unwrap();
        writer.reset();
        writer.flush().unwrap();
    }
}
