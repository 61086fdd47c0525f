//! # Team Score Calculator
//!
//! Three weighted composite scores (0–100 each) plus qualitative
//! insights. Every sub-score ships with a `limitations` block naming what
//! it cannot measure; that transparency metadata is part of the contract,
//! not decoration.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analysis::authors::{is_after_hours, AuthorStats};
use crate::analysis::files::FileStats;
use crate::types::CommitData;
use crate::utils::math::{coefficient_of_variation, gini, mean};

/// Weights for the overall blend. A design decision, not derived.
const COLLABORATION_WEIGHT: f64 = 0.4;
const CONSISTENCY_WEIGHT: f64 = 0.45;
const WORK_LIFE_WEIGHT: f64 = 0.15;

/// Ownership-shape score. High means *clearer ownership and more
/// specialization*, not more pairing — see `limitations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaborationScore {
    /// 0–100
    pub score: f64,
    /// Files with exactly one author
    pub exclusive_files: u64,
    /// Files with 2–3 authors
    pub shared_files: u64,
    /// Files with more than 3 authors
    pub collaborative_files: u64,
    /// Share of single-author files, 0–100
    pub exclusive_share: f64,
    /// Share of multi-author files, 0–100
    pub multi_author_share: f64,
    /// What this score cannot tell you
    pub limitations: Vec<String>,
}

/// Cadence and contributor-spread score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyScore {
    /// 0–100
    pub score: f64,
    /// Share of authors needed to reach 80% of the commit count, 0–100.
    /// Commit-count based — deliberately distinct from the repository's
    /// churn-based bus factor.
    pub bus_factor_percentage: f64,
    /// Authors with a commit in the trailing 30 days over all authors,
    /// 0–100
    pub active_contributor_ratio: f64,
    /// 100 minus the coefficient of variation of daily commit counts,
    /// floored at 0
    pub velocity_consistency: f64,
    /// Banded score from the average gap between consecutive commits,
    /// penalized by the gap's own variation
    pub delivery_cadence: f64,
    pub limitations: Vec<String>,
}

/// Commit-timing health score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkLifeBalanceScore {
    /// 0–100
    pub score: f64,
    /// Share of commits before 08:00 or from 18:00 local, 0–100
    pub after_hours_share: f64,
    /// Share of commits on weekends, 0–100
    pub weekend_share: f64,
    /// 100 − blended off-hours pressure
    pub commit_pattern_health: f64,
    /// Share of active days with more than one distinct committer, 0–100
    pub team_active_coverage: f64,
    pub limitations: Vec<String>,
}

/// The weighted blend plus its components and derived insights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    /// 0.4·collaboration + 0.45·consistency + 0.15·work-life balance
    pub overall: f64,
    pub collaboration: CollaborationScore,
    pub consistency: ConsistencyScore,
    pub work_life_balance: WorkLifeBalanceScore,
    /// Qualitative observations derived from the same data
    pub insights: Vec<String>,
}

/// Compute the three sub-scores and their blend.
pub fn team_score(
    commits: &[CommitData],
    authors: &[AuthorStats],
    files: &[FileStats],
    reference: DateTime<FixedOffset>,
) -> TeamScore {
    let collaboration = collaboration_score(files);
    let consistency = consistency_score(commits, authors, reference);
    let work_life_balance = work_life_balance_score(commits);

    let overall = COLLABORATION_WEIGHT * collaboration.score
        + CONSISTENCY_WEIGHT * consistency.score
        + WORK_LIFE_WEIGHT * work_life_balance.score;

    let insights = insights(authors, &collaboration, &consistency, &work_life_balance);

    TeamScore {
        overall,
        collaboration,
        consistency,
        work_life_balance,
        insights,
    }
}

/// Derived purely from file-ownership shape.
fn collaboration_score(files: &[FileStats]) -> CollaborationScore {
    let mut score = CollaborationScore {
        limitations: vec![
            "A high score means clearer single-file ownership and more \
             specialization, not more pairing or review activity."
                .to_string(),
            "File ownership is inferred from commit counts only; pair \
             programming and review contributions are invisible here."
                .to_string(),
        ],
        ..Default::default()
    };

    if files.is_empty() {
        return score;
    }

    for file in files {
        match file.authors.len() {
            1 => score.exclusive_files += 1,
            2..=3 => score.shared_files += 1,
            _ => score.collaborative_files += 1,
        }
    }

    let total = files.len() as f64;
    score.exclusive_share = score.exclusive_files as f64 / total * 100.0;
    score.multi_author_share = 100.0 - score.exclusive_share;

    // Overlap penalty is proportional to the multi-author share.
    let overlap_penalty = score.multi_author_share;
    score.score = (0.5 * score.exclusive_share
        + 0.3 * score.exclusive_share
        + 0.2 * (100.0 - overlap_penalty))
        .clamp(0.0, 100.0);
    score
}

fn consistency_score(
    commits: &[CommitData],
    authors: &[AuthorStats],
    reference: DateTime<FixedOffset>,
) -> ConsistencyScore {
    let mut score = ConsistencyScore {
        limitations: vec![
            "Commit cadence is a proxy; it says nothing about the size or \
             value of what was delivered."
                .to_string(),
            "The bus factor here is commit-count based (80% threshold) and \
             differs by design from the churn-based repository bus factor."
                .to_string(),
        ],
        ..Default::default()
    };
    if commits.is_empty() || authors.is_empty() {
        return score;
    }

    score.bus_factor_percentage = bus_factor_percentage(authors);
    score.active_contributor_ratio = active_contributor_ratio(authors, reference);
    score.velocity_consistency = velocity_consistency(commits);
    score.delivery_cadence = delivery_cadence(commits);

    score.score = 0.25 * score.bus_factor_percentage
        + 0.25 * score.active_contributor_ratio
        + 0.25 * score.velocity_consistency
        + 0.25 * score.delivery_cadence;
    score
}

/// Share of authors needed to reach 80% of total commits, 0–100.
fn bus_factor_percentage(authors: &[AuthorStats]) -> f64 {
    let total: u64 = authors.iter().map(|a| a.commits).sum();
    if total == 0 {
        return 0.0;
    }
    let mut counts: Vec<u64> = authors.iter().map(|a| a.commits).collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let threshold = total as f64 * 0.8;
    let mut cumulative = 0u64;
    let mut needed = counts.len();
    for (i, count) in counts.iter().enumerate() {
        cumulative += count;
        if cumulative as f64 >= threshold {
            needed = i + 1;
            break;
        }
    }
    needed as f64 / authors.len() as f64 * 100.0
}

/// Authors with a commit in the trailing 30 days over all authors, 0–100.
fn active_contributor_ratio(authors: &[AuthorStats], reference: DateTime<FixedOffset>) -> f64 {
    let window_start = reference - Duration::days(30);
    let active = authors
        .iter()
        .filter(|a| a.last_commit >= window_start)
        .count();
    active as f64 / authors.len() as f64 * 100.0
}

/// 100 minus the coefficient of variation (as a percentage) of per-day
/// commit counts over active days, floored at 0.
fn velocity_consistency(commits: &[CommitData]) -> f64 {
    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for commit in commits {
        *daily.entry(commit.date.date_naive()).or_insert(0) += 1;
    }
    let counts: Vec<f64> = daily.values().map(|&c| c as f64).collect();
    (100.0 - coefficient_of_variation(&counts) * 100.0).max(0.0)
}

/// Banded score from the mean gap between consecutive commits, penalized
/// (up to 40 points) by the gaps' own coefficient of variation.
fn delivery_cadence(commits: &[CommitData]) -> f64 {
    let mut timestamps: Vec<DateTime<FixedOffset>> = commits.iter().map(|c| c.date).collect();
    timestamps.sort_unstable();
    if timestamps.len() < 2 {
        return 0.0;
    }

    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 86_400.0)
        .collect();
    let avg_gap_days = mean(&gaps);

    let base = if avg_gap_days <= 1.0 {
        100.0
    } else if avg_gap_days <= 3.0 {
        90.0
    } else if avg_gap_days <= 7.0 {
        75.0
    } else if avg_gap_days <= 14.0 {
        50.0
    } else if avg_gap_days <= 30.0 {
        25.0
    } else {
        10.0
    };

    let penalty = (coefficient_of_variation(&gaps) * 40.0).min(40.0);
    (base - penalty).max(0.0)
}

fn work_life_balance_score(commits: &[CommitData]) -> WorkLifeBalanceScore {
    let mut score = WorkLifeBalanceScore {
        limitations: vec![
            "Commit timestamps are unreliable proxies for actual working \
             hours: timezones, CI pipelines, scheduled jobs, and rebases \
             all shift them."
                .to_string(),
            "Absence of off-hours commits does not demonstrate healthy \
             workloads; work can happen without commits."
                .to_string(),
        ],
        ..Default::default()
    };
    if commits.is_empty() {
        return score;
    }

    let total = commits.len() as f64;
    let after_hours = commits.iter().filter(|c| is_after_hours(c.date)).count() as f64;
    let weekend = commits
        .iter()
        .filter(|c| {
            use chrono::Datelike;
            c.date.weekday().num_days_from_monday() >= 5
        })
        .count() as f64;

    score.after_hours_share = after_hours / total * 100.0;
    score.weekend_share = weekend / total * 100.0;
    score.commit_pattern_health =
        100.0 - (0.6 * score.after_hours_share + 0.4 * score.weekend_share).min(100.0);

    // Share of active days where more than one person committed.
    let mut committers_per_day: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
    for commit in commits {
        committers_per_day
            .entry(commit.date.date_naive())
            .or_default()
            .insert(commit.author_email.as_str());
    }
    let covered = committers_per_day
        .values()
        .filter(|authors| authors.len() > 1)
        .count();
    score.team_active_coverage = covered as f64 / committers_per_day.len() as f64 * 100.0;

    score.score = 0.7 * score.commit_pattern_health + 0.3 * score.team_active_coverage;
    score
}

/// Threshold-driven qualitative observations.
fn insights(
    authors: &[AuthorStats],
    collaboration: &CollaborationScore,
    consistency: &ConsistencyScore,
    work_life_balance: &WorkLifeBalanceScore,
) -> Vec<String> {
    let mut insights = Vec::new();

    let commit_counts: Vec<f64> = authors.iter().map(|a| a.commits as f64).collect();
    let inequality = gini(&commit_counts);
    if inequality > 0.6 && authors.len() > 1 {
        insights.push(format!(
            "Commit activity is highly concentrated (Gini {:.2}); knowledge \
             may sit with very few people.",
            inequality
        ));
    }

    if collaboration.multi_author_share < 20.0 && !authors.is_empty() {
        insights.push(
            "Most files have a single author; clear ownership, but little \
             shared context."
                .to_string(),
        );
    }

    if consistency.active_contributor_ratio < 50.0 && authors.len() > 1 {
        insights.push(
            "Fewer than half the historical contributors were active in the \
             last 30 days."
                .to_string(),
        );
    }

    if work_life_balance.after_hours_share > 30.0 {
        insights.push(format!(
            "{:.0}% of commits land outside 08:00–18:00; check whether the \
             timestamps reflect real working patterns.",
            work_life_balance.after_hours_share
        ));
    }

    insights
}
