//! # Per-Author Statistics
//!
//! Three ordered passes, mirroring the engine's overall structure:
//!
//! 1. accumulate raw counters per author while walking the commit array;
//! 2. once an author's commit list is closed, derive the contribution /
//!    collaboration / work-pattern / quality detail groups with pure
//!    functions over the accumulator;
//! 3. after *all* authors exist, derive the comparative group (ranks,
//!    percentiles, specialization) — this pass needs the whole team and
//!    must not start earlier.
//!
//! Each detail group is an explicit struct built in one place; nothing is
//! filled in incrementally across passes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::analysis::governance::commit_credit;
use crate::config::AnalysisConfig;
use crate::types::CommitData;
use crate::utils::math::coefficient_of_variation;
use crate::utils::messages::{conventional_commit_type, is_revert, is_wip};

/// Commits inside this window count toward a burst.
const BURST_WINDOW_SECS: i64 = 5 * 60;
/// Minimum commits within the window to call it a burst.
const BURST_SIZE: usize = 4;
/// A pause of at least this many days counts as a vacation break.
const GAP_DAYS: i64 = 7;
/// Active days this close together continue a streak.
const STREAK_MAX_GAP_DAYS: i64 = 2;
/// Velocity trends need this many commits to mean anything.
const VELOCITY_MIN_COMMITS: usize = 10;

/// Commit-size buckets by total lines changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDistribution {
    /// < 20 lines
    pub micro: u64,
    /// < 50 lines
    pub small: u64,
    /// < 200 lines
    pub medium: u64,
    /// < 500 lines
    pub large: u64,
    /// ≥ 500 lines
    pub very_large: u64,
}

impl SizeDistribution {
    fn record(&mut self, lines: u64) {
        if lines < 20 {
            self.micro += 1;
        } else if lines < 50 {
            self.small += 1;
        } else if lines < 200 {
            self.medium += 1;
        } else if lines < 500 {
            self.large += 1;
        } else {
            self.very_large += 1;
        }
    }
}

/// First-half versus second-half commit rate, for authors with enough
/// history to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VelocityTrend {
    Increasing,
    Stable,
    Decreasing,
}

/// How much, how often, and in what rhythm an author contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionMetrics {
    pub size_distribution: SizeDistribution,
    /// Longest run of active days (gaps of ≤ 2 days keep a streak alive)
    pub longest_streak_days: u64,
    /// Windows of ≥ 4 commits within 5 minutes
    pub burst_count: u64,
    /// Pauses of ≥ 7 days between consecutive commits
    pub gap_count: u64,
    /// Longest such pause, in days
    pub longest_gap_days: u64,
    /// 0–100; blends active-day coverage with commit-count regularity
    pub consistency_score: f64,
    pub velocity_trend: VelocityTrend,
}

/// How the author's work intersects with the rest of the team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationMetrics {
    pub co_authored_commits: u64,
    /// Share of the author's commits carrying co-author trailers, 0–1
    pub co_authored_share: f64,
    /// Distinct co-author names seen in this author's trailers, sorted
    pub co_author_partners: Vec<String>,
    /// Files this author touched that at least one other author touched
    pub shared_files: u64,
    /// `shared_files` over the author's unique files, 0–1
    pub shared_file_share: f64,
}

/// When the author commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPatternMetrics {
    /// Commits before 08:00 or from 18:00 local time, as a share 0–1
    pub after_hours_share: f64,
    /// Commits on Saturday or Sunday, as a share 0–1
    pub weekend_share: f64,
    /// Hour (0–23) with the most commits
    pub peak_hour: u8,
    /// Weekday with the most commits (0 = Monday)
    pub peak_day: u8,
}

/// Message hygiene, per author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean subject length in characters
    pub avg_message_length: f64,
    /// Share of commits with a conventional subject, 0–1
    pub conventional_commit_share: f64,
    pub revert_count: u64,
    pub wip_count: u64,
    /// Mean governance credit over the author's commits, in [0, 0.95]
    pub governance_score: f64,
}

/// Standing relative to the whole team. Requires every author's pass-2
/// data, so it is filled last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeMetrics {
    /// 1-based rank by commit count (1 = most commits)
    pub commit_rank: usize,
    /// 1-based rank by churn
    pub churn_rank: usize,
    /// 1-based rank by unique files touched
    pub files_rank: usize,
    /// Share of the team strictly below this author's commit count, 0–100
    pub commit_percentile: f64,
    /// Share of the team strictly below this author's churn, 0–100
    pub churn_percentile: f64,
    /// 1 − (author's unique files / repository files); higher = narrower
    pub specialization_index: f64,
}

/// The five detail groups together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDetail {
    pub contribution: ContributionMetrics,
    pub collaboration: CollaborationMetrics,
    pub work_pattern: WorkPatternMetrics,
    pub quality: QualityMetrics,
    pub comparative: ComparativeMetrics,
}

/// Hour and weekday histograms plus the raw off-hours counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPatterns {
    /// Commits per local hour of day
    pub hour_histogram: [u32; 24],
    /// Commits per weekday, Monday first
    pub day_histogram: [u32; 7],
    pub after_hours_commits: u64,
    pub weekend_commits: u64,
}

/// Everything the engine knows about one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorStats {
    /// Display name (most recently seen spelling)
    pub name: String,
    /// Email, possibly redacted
    pub email: String,
    pub commits: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub churn: u64,
    /// Distinct files touched
    pub files_changed: u64,
    /// Distinct local calendar days with at least one commit
    pub active_days: u64,
    /// Mean churn per commit
    pub avg_commit_size: f64,
    /// Largest single-commit churn
    pub largest_commit: u64,
    pub first_commit: DateTime<FixedOffset>,
    pub last_commit: DateTime<FixedOffset>,
    pub work_patterns: WorkPatterns,
    pub detailed: AuthorDetail,
}

/// Pass-1 accumulator; closed before any pass-2 derivation runs.
struct AuthorAccumulator {
    name: String,
    email: String,
    first_commit: DateTime<FixedOffset>,
    last_commit: DateTime<FixedOffset>,
    /// Commit timestamps in log order; sorted before pass 2
    timestamps: Vec<DateTime<FixedOffset>>,
    sizes: Vec<u64>,
    insertions: u64,
    deletions: u64,
    largest_commit: u64,
    files: HashSet<String>,
    active_days: BTreeSet<NaiveDate>,
    daily_counts: BTreeMap<NaiveDate, u64>,
    hour_histogram: [u32; 24],
    day_histogram: [u32; 7],
    after_hours: u64,
    weekend: u64,
    co_authored: u64,
    partners: BTreeSet<String>,
    subject_len_sum: u64,
    conventional: u64,
    reverts: u64,
    wips: u64,
    credit_sum: f64,
}

impl AuthorAccumulator {
    fn new(commit: &CommitData) -> Self {
        Self {
            name: commit.author.clone(),
            email: commit.author_email.clone(),
            first_commit: commit.date,
            last_commit: commit.date,
            timestamps: Vec::new(),
            sizes: Vec::new(),
            insertions: 0,
            deletions: 0,
            largest_commit: 0,
            files: HashSet::new(),
            active_days: BTreeSet::new(),
            daily_counts: BTreeMap::new(),
            hour_histogram: [0; 24],
            day_histogram: [0; 7],
            after_hours: 0,
            weekend: 0,
            co_authored: 0,
            partners: BTreeSet::new(),
            subject_len_sum: 0,
            conventional: 0,
            reverts: 0,
            wips: 0,
            credit_sum: 0.0,
        }
    }

    fn accumulate(&mut self, commit: &CommitData) {
        // Latest spelling of the display name wins
        if commit.date >= self.last_commit {
            self.name = commit.author.clone();
        }
        self.first_commit = self.first_commit.min(commit.date);
        self.last_commit = self.last_commit.max(commit.date);

        self.timestamps.push(commit.date);
        self.sizes.push(commit.churn());
        self.insertions += commit.insertions;
        self.deletions += commit.deletions;
        self.largest_commit = self.largest_commit.max(commit.churn());
        for change in &commit.files {
            self.files.insert(change.path.clone());
        }

        let day = commit.date.date_naive();
        self.active_days.insert(day);
        *self.daily_counts.entry(day).or_insert(0) += 1;

        let hour = commit.date.hour() as usize;
        self.hour_histogram[hour] += 1;
        let weekday = commit.date.weekday().num_days_from_monday() as usize;
        self.day_histogram[weekday] += 1;
        if is_after_hours(commit.date) {
            self.after_hours += 1;
        }
        if weekday >= 5 {
            self.weekend += 1;
        }

        if commit.is_co_authored {
            self.co_authored += 1;
            for partner in &commit.co_authors {
                self.partners.insert(partner.name.clone());
            }
        }

        self.subject_len_sum += commit.subject.chars().count() as u64;
        if conventional_commit_type(&commit.subject).is_some() {
            self.conventional += 1;
        }
        if is_revert(&commit.subject) {
            self.reverts += 1;
        }
        if is_wip(&commit.subject) {
            self.wips += 1;
        }
        self.credit_sum += commit_credit(commit);
    }
}

/// Commits before 08:00 or from 18:00 (author-local) are after hours.
pub(crate) fn is_after_hours(date: DateTime<FixedOffset>) -> bool {
    let hour = date.hour();
    hour < 8 || hour >= 18
}

/// Run all three author passes over the commit set.
///
/// `file_author_counts` maps each path to its distinct-author count (from
/// the file pass) and feeds the shared-file collaboration metrics;
/// `total_repo_files` feeds the specialization index. Redaction is driven
/// by the explicit `config.redact_emails` flag.
pub fn author_stats(
    commits: &[CommitData],
    file_author_counts: &HashMap<String, u64>,
    total_repo_files: usize,
    config: &AnalysisConfig,
) -> Vec<AuthorStats> {
    // Pass 1: accumulate per author, keyed by lower-cased email (name as
    // fallback for commits without one).
    let mut accumulators: BTreeMap<String, AuthorAccumulator> = BTreeMap::new();
    for commit in commits {
        let key = author_key(&commit.author, &commit.author_email);
        accumulators
            .entry(key)
            .or_insert_with(|| AuthorAccumulator::new(commit))
            .accumulate(commit);
    }

    // Pass 2: close each accumulator and derive the per-author groups.
    let mut partial: Vec<(AuthorAccumulator, AuthorDetailPartial)> = accumulators
        .into_values()
        .map(|mut acc| {
            acc.timestamps.sort_unstable();
            let detail = AuthorDetailPartial {
                contribution: contribution_metrics(&acc),
                collaboration: collaboration_metrics(&acc, file_author_counts),
                work_pattern: work_pattern_metrics(&acc),
                quality: quality_metrics(&acc),
            };
            (acc, detail)
        })
        .collect();

    // Pass 3: comparative metrics need every author's totals; this runs
    // strictly after pass 2 finished for the whole team.
    let commit_counts: Vec<u64> = partial.iter().map(|(a, _)| a.timestamps.len() as u64).collect();
    let churns: Vec<u64> = partial.iter().map(|(a, _)| a.insertions + a.deletions).collect();
    let file_counts: Vec<u64> = partial.iter().map(|(a, _)| a.files.len() as u64).collect();

    let mut stats: Vec<AuthorStats> = partial
        .drain(..)
        .enumerate()
        .map(|(i, (acc, detail))| {
            let comparative = comparative_metrics(
                commit_counts[i],
                churns[i],
                file_counts[i],
                &commit_counts,
                &churns,
                &file_counts,
                total_repo_files,
            );
            build_author_stats(acc, detail, comparative, config.redact_emails)
        })
        .collect();

    stats.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.name.cmp(&b.name)));
    stats
}

fn author_key(name: &str, email: &str) -> String {
    if email.trim().is_empty() {
        name.to_string()
    } else {
        email.trim().to_ascii_lowercase()
    }
}

/// Mask the local part of an email: `jane@example.com` → `j***@example.com`.
fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap_or('*');
            format!("{first}***@{domain}")
        }
        _ => email.to_string(),
    }
}

/// Pass-2 output, waiting for the comparative group.
struct AuthorDetailPartial {
    contribution: ContributionMetrics,
    collaboration: CollaborationMetrics,
    work_pattern: WorkPatternMetrics,
    quality: QualityMetrics,
}

fn build_author_stats(
    acc: AuthorAccumulator,
    detail: AuthorDetailPartial,
    comparative: ComparativeMetrics,
    redact_emails: bool,
) -> AuthorStats {
    let commits = acc.timestamps.len() as u64;
    let churn = acc.insertions + acc.deletions;
    let avg_commit_size = if commits > 0 {
        churn as f64 / commits as f64
    } else {
        0.0
    };
    let email = if redact_emails {
        redact_email(&acc.email)
    } else {
        acc.email.clone()
    };
    AuthorStats {
        name: acc.name,
        email,
        commits,
        insertions: acc.insertions,
        deletions: acc.deletions,
        churn,
        files_changed: acc.files.len() as u64,
        active_days: acc.active_days.len() as u64,
        avg_commit_size,
        largest_commit: acc.largest_commit,
        first_commit: acc.first_commit,
        last_commit: acc.last_commit,
        work_patterns: WorkPatterns {
            hour_histogram: acc.hour_histogram,
            day_histogram: acc.day_histogram,
            after_hours_commits: acc.after_hours,
            weekend_commits: acc.weekend,
        },
        detailed: AuthorDetail {
            contribution: detail.contribution,
            collaboration: detail.collaboration,
            work_pattern: detail.work_pattern,
            quality: detail.quality,
            comparative,
        },
    }
}

fn contribution_metrics(acc: &AuthorAccumulator) -> ContributionMetrics {
    let mut size_distribution = SizeDistribution::default();
    for &size in &acc.sizes {
        size_distribution.record(size);
    }

    let (gap_count, longest_gap_days) = gaps(&acc.timestamps);
    ContributionMetrics {
        size_distribution,
        longest_streak_days: longest_streak(&acc.active_days),
        burst_count: burst_count(&acc.timestamps),
        gap_count,
        longest_gap_days,
        consistency_score: consistency_score(acc),
        velocity_trend: velocity_trend(&acc.timestamps),
    }
}

/// Longest run of active days where each step to the next active day is
/// at most 2 calendar days. Length counts the active days in the run.
fn longest_streak(active_days: &BTreeSet<NaiveDate>) -> u64 {
    let mut longest = 0u64;
    let mut current = 0u64;
    let mut previous: Option<NaiveDate> = None;
    for &day in active_days {
        current = match previous {
            Some(prev) if (day - prev).num_days() <= STREAK_MAX_GAP_DAYS => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(day);
    }
    longest
}

/// Count disjoint windows of ≥ 4 commits within 5 minutes.
fn burst_count(sorted: &[DateTime<FixedOffset>]) -> u64 {
    let mut bursts = 0u64;
    let mut i = 0usize;
    while i + BURST_SIZE <= sorted.len() {
        let window = sorted[i + BURST_SIZE - 1] - sorted[i];
        if window.num_seconds() <= BURST_WINDOW_SECS {
            bursts += 1;
            i += BURST_SIZE;
        } else {
            i += 1;
        }
    }
    bursts
}

/// (count, longest) of pauses ≥ 7 days between consecutive commits.
fn gaps(sorted: &[DateTime<FixedOffset>]) -> (u64, u64) {
    let mut count = 0u64;
    let mut longest = 0u64;
    for pair in sorted.windows(2) {
        let days = (pair[1] - pair[0]).num_days();
        if days >= GAP_DAYS {
            count += 1;
            longest = longest.max(days as u64);
        }
    }
    (count, longest)
}

/// 0–100: half active-day coverage of the author's span, half regularity
/// (one minus the coefficient of variation of per-active-day counts,
/// floored at zero).
fn consistency_score(acc: &AuthorAccumulator) -> f64 {
    if acc.timestamps.is_empty() {
        return 0.0;
    }
    let span_days = (acc.last_commit.date_naive() - acc.first_commit.date_naive()).num_days() + 1;
    if span_days <= 0 {
        return 0.0;
    }
    let active_ratio = (acc.active_days.len() as f64 / span_days as f64).min(1.0);

    let counts: Vec<f64> = acc.daily_counts.values().map(|&c| c as f64).collect();
    let regularity = (1.0 - coefficient_of_variation(&counts)).max(0.0);

    100.0 * (0.5 * active_ratio + 0.5 * regularity)
}

/// Compare first-half and second-half commit counts over equal-duration
/// halves of the author's span. Needs ≥ 10 commits; ±15% is "stable".
fn velocity_trend(sorted: &[DateTime<FixedOffset>]) -> VelocityTrend {
    if sorted.len() < VELOCITY_MIN_COMMITS {
        return VelocityTrend::Stable;
    }
    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    let midpoint = first + (last - first) / 2;
    let first_half = sorted.iter().filter(|&&t| t <= midpoint).count() as f64;
    let second_half = sorted.len() as f64 - first_half;

    if second_half > first_half * 1.15 {
        VelocityTrend::Increasing
    } else if second_half < first_half * 0.85 {
        VelocityTrend::Decreasing
    } else {
        VelocityTrend::Stable
    }
}

fn collaboration_metrics(
    acc: &AuthorAccumulator,
    file_author_counts: &HashMap<String, u64>,
) -> CollaborationMetrics {
    let commits = acc.timestamps.len() as f64;
    let shared_files = acc
        .files
        .iter()
        .filter(|path| file_author_counts.get(*path).copied().unwrap_or(0) > 1)
        .count() as u64;
    let unique_files = acc.files.len();

    CollaborationMetrics {
        co_authored_commits: acc.co_authored,
        co_authored_share: if commits > 0.0 {
            acc.co_authored as f64 / commits
        } else {
            0.0
        },
        co_author_partners: acc.partners.iter().cloned().collect(),
        shared_files,
        shared_file_share: if unique_files > 0 {
            shared_files as f64 / unique_files as f64
        } else {
            0.0
        },
    }
}

fn work_pattern_metrics(acc: &AuthorAccumulator) -> WorkPatternMetrics {
    let commits = acc.timestamps.len() as f64;
    let peak_hour = acc
        .hour_histogram
        .iter()
        .enumerate()
        .max_by_key(|(_, &count)| count)
        .map(|(hour, _)| hour as u8)
        .unwrap_or(0);
    let peak_day = acc
        .day_histogram
        .iter()
        .enumerate()
        .max_by_key(|(_, &count)| count)
        .map(|(day, _)| day as u8)
        .unwrap_or(0);

    WorkPatternMetrics {
        after_hours_share: if commits > 0.0 {
            acc.after_hours as f64 / commits
        } else {
            0.0
        },
        weekend_share: if commits > 0.0 {
            acc.weekend as f64 / commits
        } else {
            0.0
        },
        peak_hour,
        peak_day,
    }
}

fn quality_metrics(acc: &AuthorAccumulator) -> QualityMetrics {
    let commits = acc.timestamps.len() as f64;
    if commits == 0.0 {
        return QualityMetrics {
            avg_message_length: 0.0,
            conventional_commit_share: 0.0,
            revert_count: 0,
            wip_count: 0,
            governance_score: 0.0,
        };
    }
    QualityMetrics {
        avg_message_length: acc.subject_len_sum as f64 / commits,
        conventional_commit_share: acc.conventional as f64 / commits,
        revert_count: acc.reverts,
        wip_count: acc.wips,
        governance_score: acc.credit_sum / commits,
    }
}

#[allow(clippy::too_many_arguments)]
fn comparative_metrics(
    commits: u64,
    churn: u64,
    files: u64,
    all_commits: &[u64],
    all_churns: &[u64],
    all_files: &[u64],
    total_repo_files: usize,
) -> ComparativeMetrics {
    let n = all_commits.len().max(1);
    let rank = |value: u64, all: &[u64]| 1 + all.iter().filter(|&&other| other > value).count();
    let percentile = |value: u64, all: &[u64]| {
        let below = all.iter().filter(|&&other| other < value).count();
        below as f64 / n as f64 * 100.0
    };

    let specialization_index = if total_repo_files > 0 {
        1.0 - files as f64 / total_repo_files as f64
    } else {
        0.0
    };

    ComparativeMetrics {
        commit_rank: rank(commits, all_commits),
        churn_rank: rank(churn, all_churns),
        files_rank: rank(files, all_files),
        commit_percentile: percentile(commits, all_commits),
        churn_percentile: percentile(churn, all_churns),
        specialization_index,
    }
}
