//! Run-wide options shared by every processed file.

use crate::error::{PipelineError, Result};
use crate::filter::Combinator;
use crate::split::SplitSpec;
use crate::truncate::LineRange;

/// Everything the pipeline needs besides the inputs and the output.
///
/// Spec strings stay unparsed here: filters, projections and templates can
/// only be resolved against a header, so they are parsed once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Render a fixed-width table instead of CSV.
    pub human_readable: bool,
    pub range: LineRange,
    /// `col=val;...`
    pub filters: String,
    pub combinator: Combinator,
    /// `col;col;...`
    pub columns: String,
    /// When set, replaces `range` with a per-file partition.
    pub split: Option<SplitSpec>,
    /// `expr;expr;...`
    pub new_columns: String,
}

impl Options {
    /// Check the options that do not depend on any input.
    pub fn validate(&self) -> Result<()> {
        if self.range.start == 0 {
            return Err(PipelineError::InvalidStart(self.range.start));
        }
        Ok(())
    }
}
