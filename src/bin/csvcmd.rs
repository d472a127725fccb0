//! CLI tool to truncate, filter, derive and project CSV files.
//!
//! Usage:
//!   csvcmd [OPTIONS] [FILES]...
//!
//! With no files, reads standard input. Rendered rows go to stdout and
//! per-file errors to stderr.

use clap::{ArgAction, Parser};
use csvcmd::logging::init_logging;
use csvcmd::{Combinator, LineRange, Options, RawWriter, RowWriter, SplitSpec, TableWriter};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Print a range of CSV rows, filtered, extended and projected.
#[derive(Parser)]
#[command(name = "csvcmd", version, disable_help_flag = true)]
struct Cli {
    /// Print in an easy to read table
    #[arg(short = 'h', long = "human")]
    human: bool,

    /// First line after the header to read (1-based, inclusive)
    #[arg(long, default_value_t = 1)]
    start: u64,

    /// Last line after the header to read (inclusive, <= 0 reads to the end)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    end: i64,

    /// Filters on columns, e.g. 'dept=SALES;_2=x'
    #[arg(long, default_value = "")]
    filter: String,

    /// Keep a row when any single filter matches
    #[arg(long)]
    or: bool,

    /// Columns to show, e.g. 'name;_3'
    #[arg(long, default_value = "")]
    cols: String,

    /// Print partition N of D, e.g. '2/4' (needs named files)
    #[arg(long)]
    split: Option<String>,

    /// New columns from templates, e.g. '{first} {last};{id}-x'
    #[arg(long, default_value = "")]
    newcols: String,

    /// Log pipeline decisions on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Input files (default: standard input)
    files: Vec<PathBuf>,
}

impl Cli {
    fn options(&self) -> csvcmd::Result<Options> {
        let split = self
            .split
            .as_deref()
            .map(str::parse::<SplitSpec>)
            .transpose()?;
        let options = Options {
            human_readable: self.human,
            range: LineRange::from_flags(self.start, self.end),
            filters: self.filter.clone(),
            combinator: if self.or {
                Combinator::Or
            } else {
                Combinator::And
            },
            columns: self.cols.clone(),
            split,
            new_columns: self.newcols.clone(),
        };
        options.validate()?;
        Ok(options)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match cli.options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if options.split.is_some() && (cli.start != 1 || cli.end > 0) {
        tracing::warn!("--split overrides --start and --end");
    }

    let stdout = io::stdout().lock();
    let mut writer: Box<dyn RowWriter> = if options.human_readable {
        Box::new(TableWriter::new(stdout))
    } else {
        Box::new(RawWriter::new(stdout))
    };
    let mut stderr = io::stderr();

    match csvcmd::run_paths(&cli.files, &options, &mut *writer, &mut stderr) {
        Ok(summary) if summary.all_succeeded() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
