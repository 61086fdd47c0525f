//! # Analytics Engine
//!
//! Multi-pass statistical reduction over the collected commit array.
//! The passes are strictly ordered: per-commit accumulation first, then
//! per-author derivation, then the comparative pass that needs every
//! author's data — a hard barrier, not a scheduling preference. The team
//! score calculator and the daily trends analyzer both consume the closed
//! passes (and the raw commit array) independently of each other.

mod cache;

pub mod authors;
pub mod files;
pub mod governance;
pub mod repository;
pub mod risk;
pub mod team;
pub mod trends;


pub use authors::{AuthorDetail, AuthorStats, VelocityTrend};
pub use cache::CacheManager;
pub use files::FileStats;
pub use governance::GovernanceAnalysis;
pub use repository::RepositoryStats;
pub use risk::RiskAnalysis;
pub use team::TeamScore;
pub use trends::DailyTrendsData;

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, FixedOffset};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::collection::collect_commits;
use crate::config::{AnalysisConfig, LogFilters, TrendsConfig};
use crate::error::Result;
use crate::types::CommitData;

/// The single immutable result object one run hands to its consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The full parsed commit set, in log order
    pub commits: Vec<CommitData>,
    pub repository: RepositoryStats,
    pub authors: Vec<AuthorStats>,
    pub files: Vec<FileStats>,
    pub risk: RiskAnalysis,
    pub governance: GovernanceAnalysis,
    pub team_score: TeamScore,
    pub daily_trends: DailyTrendsData,
    /// Parse and enhancement warnings accumulated during collection
    pub warnings: Vec<String>,
}

/// The headline numbers hosts typically render first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_commits: u64,
    pub total_authors: u64,
    pub total_files: u64,
    pub total_churn: u64,
    pub bus_factor: usize,
    pub health_score: f64,
    pub team_score: f64,
}

impl AnalysisReport {
    /// Condense the report to its headline numbers.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_commits: self.repository.total_commits,
            total_authors: self.repository.total_authors,
            total_files: self.repository.total_files,
            total_churn: self.repository.total_churn,
            bus_factor: self.repository.bus_factor,
            health_score: self.repository.health_score,
            team_score: self.team_score.overall,
        }
    }
}

/// Run every analysis pass over an already-collected commit set.
///
/// `warnings` carries whatever the collection phase accumulated; it is
/// attached to the report untouched.
pub fn analyze_commits(
    commits: Vec<CommitData>,
    warnings: Vec<String>,
    config: &AnalysisConfig,
    trends_config: &TrendsConfig,
) -> Result<AnalysisReport> {
    config.validate()?;
    trends_config.validate()?;
    let started = Instant::now();

    let reference = reference_date(&commits, config);

    // File pass first: the author pass needs per-file author counts for
    // its collaboration metrics.
    let files = files::file_stats(&commits, reference);
    let file_author_counts: HashMap<String, u64> = files
        .iter()
        .map(|f| (f.path.clone(), f.authors.len() as u64))
        .collect();

    let authors = authors::author_stats(&commits, &file_author_counts, files.len(), config);
    let governance = governance::governance_analysis(&commits);
    let repository = repository::repository_stats(&commits, &authors, &files, &governance, reference);
    let risk = risk::risk_analysis(&files);

    // Team score and daily trends read the closed passes independently;
    // neither depends on the other.
    let team_score = team::team_score(&commits, &authors, &files, reference);
    let daily_trends = trends::daily_trends(&commits, trends_config)?;

    debug!(
        "analyzed {} commits / {} authors / {} files in {:?}",
        commits.len(),
        authors.len(),
        files.len(),
        started.elapsed()
    );

    Ok(AnalysisReport {
        commits,
        repository,
        authors,
        files,
        risk,
        governance,
        team_score,
        daily_trends,
        warnings,
    })
}

/// Collect and analyze the repository containing `path` in one call.
///
/// This is the flagship entry point: it spawns the log command, streams
/// the output through the frame parser, and runs every analysis pass over
/// the materialized commit array.
pub async fn analyze_repository(
    path: &Path,
    filters: &LogFilters,
    config: &AnalysisConfig,
    trends_config: &TrendsConfig,
) -> Result<AnalysisReport> {
    let collected = collect_commits(path, filters, config).await?;
    analyze_commits(collected.commits, collected.warnings, config, trends_config)
}

/// Recency anchor: the explicit override, else the newest commit date,
/// else the epoch (only reachable for an empty history, where nothing
/// recency-based is computed anyway).
fn reference_date(commits: &[CommitData], config: &AnalysisConfig) -> DateTime<FixedOffset> {
    config
        .reference_date
        .or_else(|| commits.iter().map(|c| c.date).max())
        .unwrap_or_else(|| chrono::DateTime::<chrono::Utc>::default().into())
}
