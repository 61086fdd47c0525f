//! # Per-File Statistics
//!
//! Accumulates churn, authorship, and ownership per path, then derives
//! the risk and hotspot scores. Both scores are weighted blends of
//! saturating components, so they are within [0, 1] by construction.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::types::CommitData;

/// Statistics for one path across the analyzed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    /// Path as emitted by the log stream (the new side of a rename)
    pub path: String,
    /// Commits that touched this path
    pub commits: u64,
    /// Distinct author display names, sorted
    pub authors: Vec<String>,
    /// Insertions plus deletions
    pub churn: u64,
    pub insertions: u64,
    pub deletions: u64,
    /// Date of the oldest commit touching the path
    pub first_change: DateTime<FixedOffset>,
    /// Date of the newest commit touching the path
    pub last_change: DateTime<FixedOffset>,
    /// Composite change-risk indicator, in [0, 1]
    pub risk_score: f64,
    /// Change frequency × author breadth × volume indicator, in [0, 1]
    pub hotspot_score: f64,
    /// Display name → commit count on this path
    pub ownership: BTreeMap<String, u64>,
}

struct FileAccumulator {
    commits: u64,
    churn: u64,
    insertions: u64,
    deletions: u64,
    first_change: DateTime<FixedOffset>,
    last_change: DateTime<FixedOffset>,
    ownership: BTreeMap<String, u64>,
}

/// Reduce the commit set into per-file statistics, sorted by path.
///
/// `reference` anchors the recency component of the risk score; pass the
/// newest commit date (or an explicit override) so results are
/// reproducible.
pub fn file_stats(commits: &[CommitData], reference: DateTime<FixedOffset>) -> Vec<FileStats> {
    let mut accumulators: BTreeMap<String, FileAccumulator> = BTreeMap::new();

    for commit in commits {
        for change in &commit.files {
            let acc = accumulators
                .entry(change.path.clone())
                .or_insert_with(|| FileAccumulator {
                    commits: 0,
                    churn: 0,
                    insertions: 0,
                    deletions: 0,
                    first_change: commit.date,
                    last_change: commit.date,
                    ownership: BTreeMap::new(),
                });
            acc.commits += 1;
            acc.churn += change.churn();
            acc.insertions += change.insertions;
            acc.deletions += change.deletions;
            if commit.date < acc.first_change {
                acc.first_change = commit.date;
            }
            if commit.date > acc.last_change {
                acc.last_change = commit.date;
            }
            *acc.ownership.entry(commit.author.clone()).or_insert(0) += 1;
        }
    }

    accumulators
        .into_iter()
        .map(|(path, acc)| {
            let authors: Vec<String> = acc.ownership.keys().cloned().collect();
            let risk_score = risk_score(
                acc.churn,
                authors.len() as u64,
                acc.commits,
                acc.last_change,
                reference,
            );
            let hotspot_score = hotspot_score(acc.commits, authors.len() as u64, acc.churn);
            FileStats {
                path,
                commits: acc.commits,
                authors,
                churn: acc.churn,
                insertions: acc.insertions,
                deletions: acc.deletions,
                first_change: acc.first_change,
                last_change: acc.last_change,
                risk_score,
                hotspot_score,
                ownership: acc.ownership,
            }
        })
        .collect()
}

/// 0.35·churn + 0.25·author breadth + 0.25·change count + 0.15·recency,
/// each component saturating at 1.
fn risk_score(
    churn: u64,
    author_count: u64,
    commit_count: u64,
    last_change: DateTime<FixedOffset>,
    reference: DateTime<FixedOffset>,
) -> f64 {
    let churn_factor = (churn as f64 / 5000.0).min(1.0);
    let author_factor = (author_count as f64 / 10.0).min(1.0);
    let commit_factor = (commit_count as f64 / 100.0).min(1.0);
    let recency = recency_factor(last_change, reference);
    0.35 * churn_factor + 0.25 * author_factor + 0.25 * commit_factor + 0.15 * recency
}

/// 1 within 30 days of the reference, decaying linearly to 0 at one year.
fn recency_factor(last_change: DateTime<FixedOffset>, reference: DateTime<FixedOffset>) -> f64 {
    let days = (reference - last_change).num_days();
    if days <= 30 {
        1.0
    } else if days >= 365 {
        0.0
    } else {
        1.0 - (days - 30) as f64 / 335.0
    }
}

/// 0.4·commit frequency + 0.35·author breadth + 0.25·churn volume, each
/// component saturating at 1.
fn hotspot_score(commit_count: u64, author_count: u64, churn: u64) -> f64 {
    let commit_factor = (commit_count as f64 / 50.0).min(1.0);
    let author_factor = (author_count as f64 / 8.0).min(1.0);
    let churn_factor = (churn as f64 / 3000.0).min(1.0);
    0.4 * commit_factor + 0.35 * author_factor + 0.25 * churn_factor
}
