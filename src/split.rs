//! Split a file into `D` contiguous partitions and pick partition `N`.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;
use crate::truncate::LineRange;

/// A parsed `N/D` split: partition `N` (1-based) of `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSpec {
    pub part: u64,
    pub parts: u64,
}

impl SplitSpec {
    pub fn new(part: u64, parts: u64) -> Result<Self, PipelineError> {
        check(part, parts).map_err(|reason| split_error(&format!("{part}/{parts}"), reason))?;
        Ok(Self { part, parts })
    }

    /// Line range of this partition for a file with `total` data rows.
    ///
    /// Both bounds are derived independently with floor division, so the
    /// partitions tile `1..=total` exactly. A partition can be empty when
    /// there are fewer rows than parts; its `stop` is then below `start`.
    pub fn range(&self, total: u64) -> LineRange {
        let start = (self.part - 1) * total / self.parts + 1;
        let stop = self.part * total / self.parts;
        LineRange::new(start, Some(stop))
    }
}

fn check(part: u64, parts: u64) -> Result<(), &'static str> {
    if parts == 0 {
        Err("denominator must be greater than zero")
    } else if part == 0 {
        Err("partitions are numbered from 1")
    } else if part > parts {
        Err("numerator exceeds denominator")
    } else {
        Ok(())
    }
}

fn split_error(spec: &str, reason: &str) -> PipelineError {
    PipelineError::SplitConfig {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for SplitSpec {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((num, den)) = s.split_once('/') else {
            return Err(split_error(s, "expected N/D"));
        };
        let part: u64 = num
            .trim()
            .parse()
            .map_err(|_| split_error(s, "invalid numerator"))?;
        let parts: u64 = den
            .trim()
            .parse()
            .map_err(|_| split_error(s, "invalid denominator"))?;
        check(part, parts).map_err(|reason| split_error(s, reason))?;
        Ok(Self { part, parts })
    }
}

impl fmt::Display for SplitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.part, self.parts)
    }
}
