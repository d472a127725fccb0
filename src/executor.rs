//! Pull-based pipeline driver.
//!
//! Each input is run through the whole stage chain before the next one
//! starts:
//!
//! ```text
//! CsvSource -> TruncatingReader -> ColumnSynthesizer -> FilterReader -> ProjectionMask -> RowWriter
//! ```
//!
//! The writer pulls nothing itself; the driver asks the outermost stage for
//! rows until it runs dry, then flushes and resets the writer so the next
//! input starts from a clean layout.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Options;
use crate::error::{PipelineError, Result};
use crate::filter::{FilterReader, parse_filters};
use crate::projection::ProjectionMask;
use crate::render::RowWriter;
use crate::row::ColumnLookup;
use crate::source::{CsvSource, count_data_rows};
use crate::template::{ColumnSynthesizer, parse_definitions};
use crate::truncate::{LineRange, TruncatingReader};

/// Name used in diagnostics when reading standard input.
pub const STDIN_NAME: &str = "STDIN";

/// An input file opened ahead of processing.
#[derive(Debug)]
pub struct InputFile {
    pub name: String,
    file: File,
}

impl InputFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PipelineError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            name: path.display().to_string(),
            file,
        })
    }

    /// Line range for this file, counting its rows first when splitting.
    fn resolve_range(&mut self, options: &Options) -> Result<LineRange> {
        let Some(split) = options.split else {
            return Ok(options.range);
        };
        let total = count_data_rows(&mut self.file)?;
        self.file.seek(SeekFrom::Start(0))?;
        let range = split.range(total);
        debug!(file = %self.name, total, %split, ?range, "split partition");
        Ok(range)
    }
}

/// Open every path up front. The first failure aborts the whole run.
pub fn open_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<InputFile>> {
    paths.iter().map(|p| InputFile::open(p.as_ref())).collect()
}

/// Counts for one successfully processed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSummary {
    /// Data rows written, header excluded.
    pub rows_written: u64,
    /// Rows read but dropped by the filters.
    pub rows_rejected: u64,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_processed: usize,
    /// Names of inputs that failed, in processing order.
    pub failed: Vec<String>,
    pub rows_written: u64,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

fn emit(writer: &mut dyn RowWriter, mask: &ProjectionMask, row: &[String]) -> Result<()> {
    if mask.keeps_all() {
        writer.write_row(row)
    } else {
        writer.write_row(&mask.project(row))
    }
}

/// Run one input through the full pipeline into `writer`.
///
/// Every per-file setup step (templates, filters, projection) completes
/// before anything is written, so a setup error leaves no partial header.
/// The caller flushes and resets the writer afterwards.
pub fn process_file<R: Read>(
    input: R,
    range: LineRange,
    options: &Options,
    writer: &mut dyn RowWriter,
) -> Result<FileSummary> {
    let (header, reader) = TruncatingReader::open(CsvSource::new(input), range)?;

    let definitions = parse_definitions(&options.new_columns, &ColumnLookup::new(&header))?;
    let synthesizer = ColumnSynthesizer::new(reader, definitions);
    let header = synthesizer.extend_header(&header);

    let lookup = ColumnLookup::new(&header);
    let predicates = parse_filters(&options.filters, &lookup)?;
    let mask = ProjectionMask::build(&options.columns, &lookup, header.len())?;
    let mut filtered = FilterReader::new(synthesizer, predicates, options.combinator);

    emit(writer, &mask, &header)?;
    let mut summary = FileSummary::default();
    while filtered.scan() {
        emit(writer, &mask, filtered.row())?;
        summary.rows_written += 1;
    }
    summary.rows_rejected = filtered.rejected();

    match filtered.take_error() {
        Some(e) => Err(e),
        None => Ok(summary),
    }
}

/// Record the outcome of one input, reporting failures on `diagnostics`.
fn finish_input(
    name: &str,
    outcome: Result<FileSummary>,
    writer: &mut dyn RowWriter,
    run: &mut RunSummary,
    diagnostics: &mut dyn Write,
) -> Result<()> {
    let flushed = writer.flush();
    writer.reset();

    match outcome.and_then(|summary| flushed.map(|()| summary)) {
        Ok(summary) => {
            info!(
                file = name,
                rows = summary.rows_written,
                rejected = summary.rows_rejected,
                "processed"
            );
            run.files_processed += 1;
            run.rows_written += summary.rows_written;
        }
        Err(e) => {
            warn!(file = name, error = %e, "input failed");
            writeln!(diagnostics, "Error processing {name}: {e}")?;
            run.failed.push(name.to_string());
        }
    }
    Ok(())
}

/// Process already opened files in order.
///
/// A failing file is reported on `diagnostics` and skipped; the run only
/// returns `Err` for invalid options or an unwritable diagnostics stream.
pub fn run(
    inputs: &mut [InputFile],
    options: &Options,
    writer: &mut dyn RowWriter,
    diagnostics: &mut dyn Write,
) -> Result<RunSummary> {
    options.validate()?;
    let mut summary = RunSummary::default();

    for input in inputs.iter_mut() {
        debug!(file = %input.name, "processing");
        let outcome = input
            .resolve_range(options)
            .and_then(|range| process_file(&mut input.file, range, options, writer));
        finish_input(&input.name, outcome, writer, &mut summary, diagnostics)?;
    }

    info!(
        processed = summary.files_processed,
        failed = summary.failed.len(),
        rows = summary.rows_written,
        "run complete"
    );
    Ok(summary)
}

/// Process a single unseekable stream such as standard input.
///
/// Split mode needs a counting pass and is reported as a failure here.
pub fn run_stream<R: Read>(
    name: &str,
    input: R,
    options: &Options,
    writer: &mut dyn RowWriter,
    diagnostics: &mut dyn Write,
) -> Result<RunSummary> {
    options.validate()?;
    let mut summary = RunSummary::default();

    let outcome = match options.split {
        Some(_) => Err(PipelineError::SplitRequiresFile),
        None => process_file(input, options.range, options, writer),
    };
    finish_input(name, outcome, writer, &mut summary, diagnostics)?;
    Ok(summary)
}

/// Open `paths` and process them, or standard input when `paths` is empty.
pub fn run_paths(
    paths: &[PathBuf],
    options: &Options,
    writer: &mut dyn RowWriter,
    diagnostics: &mut dyn Write,
) -> Result<RunSummary> {
    if paths.is_empty() {
        let stdin = std::io::stdin().lock();
        return run_stream(STDIN_NAME, stdin, options, writer, diagnostics);
    }
    let mut inputs = open_inputs(paths)?;
    run(&mut inputs, options, writer, diagnostics)
}
