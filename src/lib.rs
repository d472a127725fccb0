//! # csvcmd
//!
//! A streaming row pipeline for CSV files.
//!
//! ## Overview
//!
//! Each input file flows through a fixed chain of stages, one row at a time:
//! - **Truncation**: keep only a 1-based line range after the header
//! - **Column synthesis**: append cells built from `{column}` templates
//! - **Filtering**: keep rows whose columns equal given values (AND or OR)
//! - **Projection**: keep a subset of columns, in header order
//! - **Rendering**: raw CSV, or a fixed-width table for humans
//!
//! Every reading stage implements [`RowSource`], so stages stack freely.
//!
//! ## Example
//!
//! ```
//! use csvcmd::{Options, RawWriter, run_stream};
//!
//! let input = "dept,name\nSALES,Smith\nENG,Jones\nSALES,Doe\n";
//! let options = Options {
//!     filters: "dept=SALES".to_string(),
//!     columns: "name".to_string(),
//!     ..Options::default()
//! };
//!
//! let mut writer = RawWriter::new(Vec::new());
//! let mut diagnostics = Vec::new();
//! let summary = run_stream("example", input.as_bytes(), &options, &mut writer, &mut diagnostics)
//!     .unwrap();
//!
//! assert_eq!(summary.rows_written, 2);
//! let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(out, "name\nSmith\nDoe\n");
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod logging;
pub mod projection;
pub mod render;
pub mod row;
pub mod source;
pub mod split;
pub mod template;
pub mod truncate;

pub use config::Options;
pub use error::{PipelineError, Result, Stage};
pub use executor::{
    FileSummary, InputFile, RunSummary, STDIN_NAME, open_inputs, process_file, run, run_paths,
    run_stream,
};
pub use filter::{Combinator, FilterReader, Predicate, parse_filters};
pub use projection::ProjectionMask;
pub use render::{RawWriter, RowWriter, TableWriter};
pub use row::{ColumnLookup, Row};
pub use source::{CsvSource, MemorySource, RowSource, count_data_rows, from_rows};
pub use split::SplitSpec;
pub use template::{ColumnDefinition, ColumnSynthesizer, Expression, parse_definitions};
pub use truncate::{LineRange, TruncatingReader};
