//! # Git Commit Analytics Library
//!
//! `gitpulse` is a library for turning a Git commit history into
//! quantitative repository, author, team, and trend analytics. It streams
//! the output of an external `git log` invocation through an incremental
//! frame parser, then runs a multi-pass statistical reduction over the
//! materialized commit set.
//!
//! ## Features
//!
//! - Streaming, chunk-boundary-invariant commit log parsing
//! - Per-author statistics: contribution, collaboration, work patterns,
//!   message quality, and team-relative standing
//! - Per-file risk and hotspot scoring with ownership maps
//! - Repository totals, language breakdown, bus factor, health score
//! - Team collaboration / consistency / work-life-balance scores with
//!   explicit limitations metadata
//! - Daily trends with a contribution calendar, zero-filled for quiet days
//! - Branch, author, date-range, and path filtering
//! - Caching of analysis results for embedding hosts
//!
//! ## Example
//!
//! ```no_run
//! use gitpulse::{analyze_repository, AnalysisConfig, LogFilters, TrendsConfig};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), gitpulse::Error> {
//! let report = analyze_repository(
//!     Path::new("."),
//!     &LogFilters::default(),
//!     &AnalysisConfig::default(),
//!     &TrendsConfig::default(),
//! )
//! .await?;
//!
//! println!(
//!     "{} commits by {} authors, bus factor {}",
//!     report.repository.total_commits,
//!     report.repository.total_authors,
//!     report.repository.bus_factor,
//! );
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod collection;
pub mod config;
pub mod error;
pub mod types;
pub mod utils;

// Re-export the main entry points and result types for convenience
pub use analysis::{
    analyze_commits, analyze_repository, AnalysisReport, AuthorStats, CacheManager,
    DailyTrendsData, FileStats, GovernanceAnalysis, ReportSummary, RepositoryStats, RiskAnalysis,
    TeamScore,
};
pub use collection::{available_branches, collect_commits, CollectedCommits};
pub use config::{AnalysisConfig, LogFilters, TrendsConfig};
pub use error::Error;
pub use types::{CommitCategory, CommitData, FileChange, FileStatus};
