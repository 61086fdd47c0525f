//! # Configuration
//!
//! Small, explicit configuration structs passed by value into each
//! component's entry point. Each struct validates itself before a run
//! starts so bad combinations fail fast with [`Error::InvalidConfig`]
//! rather than surfacing as odd numbers deep inside a pass.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Filters applied to the `git log` invocation.
///
/// All fields are optional; an empty filter set analyzes the full history
/// of the current branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogFilters {
    /// Only include commits after this date (passed to `--since`)
    pub since: Option<NaiveDate>,
    /// Only include commits up to this date (passed to `--until`)
    pub until: Option<NaiveDate>,
    /// Branch to walk instead of HEAD
    pub branch: Option<String>,
    /// Only include commits whose author matches (passed to `--author`)
    pub author: Option<String>,
    /// Restrict the log to a path prefix
    pub path: Option<String>,
}

impl LogFilters {
    /// Check date ordering. An inverted `since`/`until` pair is rejected.
    pub fn validate(&self) -> Result<()> {
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(Error::InvalidConfig(format!(
                    "since ({since}) is after until ({until})"
                )));
            }
        }
        Ok(())
    }
}

/// Options for the analysis passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Mask the local part of author emails in all output structures.
    ///
    /// Carried explicitly into every function that renders an email; there
    /// is no hidden instance state behind this flag.
    pub redact_emails: bool,
    /// Anchor for recency-based metrics (file risk decay, trailing-30-day
    /// activity). Defaults to the newest commit in the analyzed set so the
    /// same history always produces the same scores.
    pub reference_date: Option<DateTime<FixedOffset>>,
    /// Emit a progress log line every N parsed commits. Advisory only.
    pub progress_interval: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            redact_emails: false,
            reference_date: None,
            progress_interval: 200,
        }
    }
}

impl AnalysisConfig {
    /// A zero progress interval would divide by zero in the cadence check.
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval == 0 {
            return Err(Error::InvalidConfig(
                "progress_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Explicit calendar range for the daily trends analyzer.
///
/// When absent, the range spans from the first to the last commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// First calendar day to report (inclusive)
    pub start: Option<NaiveDate>,
    /// Last calendar day to report (inclusive)
    pub end: Option<NaiveDate>,
}

impl TrendsConfig {
    /// Reject inverted ranges.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(Error::InvalidConfig(format!(
                    "trends range start ({start}) is after end ({end})"
                )));
            }
        }
        Ok(())
    }
}
