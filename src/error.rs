//! Error type shared by every pipeline stage.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage whose column name failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Filter,
    Projection,
    Template,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Filter => "filter",
            Stage::Projection => "projection",
            Stage::Template => "template",
        })
    }
}

/// Errors raised while setting up or driving the row pipeline.
///
/// `Open`, `SplitConfig` and `InvalidStart` stop a run before any input is
/// processed. Everything else is reported against the input it happened on,
/// and the run moves on to the next input.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot open '{}': {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is empty, no header row found")]
    EmptyInput,

    #[error("failed to read header row: {0}")]
    HeaderRead(#[source] Box<PipelineError>),

    #[error("start line {start} is past the end of input ({available} data rows)")]
    PrematureEndOfStream { start: u64, available: u64 },

    #[error("couldn't parse filter '{0}'")]
    FilterParse(String),

    #[error("{stage}: couldn't find column '{name}'")]
    ColumnNotFound { stage: Stage, name: String },

    #[error("bad column template '{template}': {reason}")]
    TemplateParse { template: String, reason: String },

    #[error("bad split '{spec}': {reason}")]
    SplitConfig { spec: String, reason: String },

    #[error("split needs a named file, standard input cannot be counted in advance")]
    SplitRequiresFile,

    #[error("start line must be at least 1, got {0}")]
    InvalidStart(u64),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn column_not_found(stage: Stage, name: &str) -> Self {
        PipelineError::ColumnNotFound {
            stage,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_column_and_stage() {
        let err = PipelineError::column_not_found(Stage::Filter, "price");
        assert_eq!(err.to_string(), "filter: couldn't find column 'price'");
        let err = PipelineError::column_not_found(Stage::Projection, "");
        assert_eq!(err.to_string(), "projection: couldn't find column ''");
        let err = PipelineError::column_not_found(Stage::Template, "x");
        assert_eq!(err.to_string(), "template: couldn't find column 'x'");
    }

    #[test]
    fn test_header_read_keeps_source() {
        let inner = PipelineError::Io(std::io::Error::other("disk gone"));
        let err = PipelineError::HeaderRead(Box::new(inner));
        assert!(err.to_string().contains("disk gone"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
