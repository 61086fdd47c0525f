//! # Daily Trends Analyzer
//!
//! Buckets commits into local calendar days — zero-filled for inactive
//! days inside the requested range — and computes five families of
//! day-level metrics plus a contribution calendar grouped into ISO weeks.
//!
//! "Local" means each commit's own UTC offset as recorded in the log
//! stream; no wall-clock timezone of the analyzing machine is involved.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analysis::authors::is_after_hours;
use crate::config::TrendsConfig;
use crate::error::Result;
use crate::types::CommitData;
use crate::utils::math::{median, percentile};
use crate::utils::messages::conventional_commit_type;

/// Files touched within this many prior days count as retouches.
const RETOUCH_WINDOW_DAYS: i64 = 14;
/// Ownership window for the single-owner check.
const OWNERSHIP_WINDOW_DAYS: i64 = 90;
/// Subjects shorter than this are "short messages".
const SHORT_MESSAGE_LEN: usize = 20;

/// Volume and shape of one day's work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub commits: u64,
    pub unique_authors: u64,
    /// Insertions plus deletions
    pub gross_lines: u64,
    pub insertions: u64,
    pub deletions: u64,
    /// Distinct files touched
    pub files_touched: u64,
    /// Median commit churn
    pub commit_size_p50: f64,
    /// 90th-percentile commit churn
    pub commit_size_p90: f64,
}

/// Signals that the day's changes may be unstable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStability {
    pub date: NaiveDate,
    /// Commits whose message mentions "revert" (case-insensitive)
    pub reverts: u64,
    /// Merge commits over all commits, 0–1
    pub merge_ratio: f64,
    /// Fraction of today's files also touched in the prior 14 days, 0–1
    pub retouch_rate: f64,
    /// Rename stat lines seen today
    pub renames: u64,
    /// Commits outside 08:00–18:00 local, as a share 0–1
    pub out_of_hours_share: f64,
}

/// Who owns what the day touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyOwnership {
    pub date: NaiveDate,
    /// Files whose first-ever change happened today
    pub new_files: u64,
    /// Files touched today whose trailing-90-day author set has exactly
    /// one member
    pub single_owner_files: u64,
    /// Mean distinct authors per file touched today
    pub avg_authors_per_file: f64,
}

/// How entangled the day's commits were.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyCoupling {
    pub date: NaiveDate,
    /// Mean file pairs changed together per commit (n·(n−1)/2 per
    /// n-file commit)
    pub co_change_density: f64,
}

/// Message hygiene for the day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyHygiene {
    pub date: NaiveDate,
    /// Median subject length in characters
    pub median_message_length: f64,
    /// Subjects under 20 characters
    pub short_messages: u64,
    /// Conventional-commit subjects
    pub conventional_commits: u64,
}

/// One cell of the contribution calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub commits: u64,
    /// 0–4, relative to the busiest day in range
    pub intensity: u8,
}

/// One ISO-8601 week of the contribution calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionWeek {
    pub iso_year: i32,
    pub iso_week: u32,
    pub days: Vec<ContributionDay>,
}

/// GitHub-style contribution calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionGraphData {
    pub weeks: Vec<ContributionWeek>,
    /// The busiest single day in range, the intensity anchor
    pub max_daily_commits: u64,
}

/// All per-day series for one analyzed range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendsData {
    /// How days were bucketed
    pub timezone: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub total_days: u64,
    /// Days with at least one commit
    pub active_days: u64,
    pub flow: Vec<DailyFlow>,
    pub stability: Vec<DailyStability>,
    pub ownership: Vec<DailyOwnership>,
    pub coupling: Vec<DailyCoupling>,
    pub hygiene: Vec<DailyHygiene>,
    pub contribution_graph: ContributionGraphData,
}

/// Compute every day-level series over the requested range, or over the
/// first–last commit span when no range is given.
pub fn daily_trends(commits: &[CommitData], config: &TrendsConfig) -> Result<DailyTrendsData> {
    config.validate()?;

    let mut data = DailyTrendsData {
        timezone: "author-local offsets".to_string(),
        ..Default::default()
    };

    let commit_span = commit_span(commits);
    let start = config.start.or(commit_span.map(|(s, _)| s));
    let end = config.end.or(commit_span.map(|(_, e)| e));
    let (Some(start), Some(end)) = (start, end) else {
        // No commits and no explicit range: nothing to report.
        return Ok(data);
    };
    if start > end {
        // An explicit bound on one side can invert against the commit
        // span on the other; an empty range is the honest answer.
        return Ok(data);
    }

    data.start = Some(start);
    data.end = Some(end);
    data.total_days = (end - start).num_days() as u64 + 1;

    // Commits bucketed by local calendar day; days outside the range are
    // still indexed because the retouch/ownership windows reach back
    // before the range start.
    let mut by_day: BTreeMap<NaiveDate, Vec<&CommitData>> = BTreeMap::new();
    for commit in commits {
        by_day.entry(commit.date.date_naive()).or_default().push(commit);
    }

    // Per-file touch days and (day, author) pairs for the windowed checks.
    let mut file_touch_days: HashMap<&str, BTreeSet<NaiveDate>> = HashMap::new();
    let mut file_day_authors: HashMap<&str, Vec<(NaiveDate, &str)>> = HashMap::new();
    let mut file_first_touch: HashMap<&str, NaiveDate> = HashMap::new();
    for commit in commits {
        let day = commit.date.date_naive();
        for change in &commit.files {
            let path = change.path.as_str();
            file_touch_days.entry(path).or_default().insert(day);
            file_day_authors
                .entry(path)
                .or_default()
                .push((day, commit.author_email.as_str()));
            file_first_touch
                .entry(path)
                .and_modify(|first| {
                    if day < *first {
                        *first = day;
                    }
                })
                .or_insert(day);
        }
    }

    let mut max_daily_commits = 0u64;
    let mut day = start;
    while day <= end {
        let empty = Vec::new();
        let day_commits = by_day.get(&day).unwrap_or(&empty);
        if !day_commits.is_empty() {
            data.active_days += 1;
        }
        max_daily_commits = max_daily_commits.max(day_commits.len() as u64);

        data.flow.push(flow_for_day(day, day_commits));
        data.stability
            .push(stability_for_day(day, day_commits, &file_touch_days));
        data.ownership.push(ownership_for_day(
            day,
            day_commits,
            &file_day_authors,
            &file_first_touch,
        ));
        data.coupling.push(coupling_for_day(day, day_commits));
        data.hygiene.push(hygiene_for_day(day, day_commits));

        day = day + Duration::days(1);
    }

    data.contribution_graph = contribution_graph(&data.flow, max_daily_commits);
    Ok(data)
}

fn commit_span(commits: &[CommitData]) -> Option<(NaiveDate, NaiveDate)> {
    let first = commits.iter().map(|c| c.date.date_naive()).min()?;
    let last = commits.iter().map(|c| c.date.date_naive()).max()?;
    Some((first, last))
}

fn touched_files<'a>(day_commits: &[&'a CommitData]) -> BTreeSet<&'a str> {
    day_commits
        .iter()
        .flat_map(|c| c.files.iter().map(|f| f.path.as_str()))
        .collect()
}

fn flow_for_day(date: NaiveDate, day_commits: &[&CommitData]) -> DailyFlow {
    let mut flow = DailyFlow {
        date,
        commits: day_commits.len() as u64,
        ..Default::default()
    };
    if day_commits.is_empty() {
        return flow;
    }

    let authors: BTreeSet<&str> = day_commits.iter().map(|c| c.author_email.as_str()).collect();
    flow.unique_authors = authors.len() as u64;
    flow.insertions = day_commits.iter().map(|c| c.insertions).sum();
    flow.deletions = day_commits.iter().map(|c| c.deletions).sum();
    flow.gross_lines = flow.insertions + flow.deletions;
    flow.files_touched = touched_files(day_commits).len() as u64;

    let sizes: Vec<f64> = day_commits.iter().map(|c| c.churn() as f64).collect();
    flow.commit_size_p50 = median(&sizes);
    flow.commit_size_p90 = percentile(&sizes, 90);
    flow
}

fn stability_for_day(
    date: NaiveDate,
    day_commits: &[&CommitData],
    file_touch_days: &HashMap<&str, BTreeSet<NaiveDate>>,
) -> DailyStability {
    let mut stability = DailyStability {
        date,
        ..Default::default()
    };
    if day_commits.is_empty() {
        return stability;
    }

    let total = day_commits.len() as f64;
    stability.reverts = day_commits
        .iter()
        .filter(|c| c.message().to_ascii_lowercase().contains("revert"))
        .count() as u64;
    stability.merge_ratio = day_commits.iter().filter(|c| c.is_merge).count() as f64 / total;
    stability.out_of_hours_share =
        day_commits.iter().filter(|c| is_after_hours(c.date)).count() as f64 / total;
    stability.renames = day_commits
        .iter()
        .flat_map(|c| &c.files)
        .filter(|f| f.old_path.is_some())
        .count() as u64;

    let today = touched_files(day_commits);
    if !today.is_empty() {
        let window_start = date - Duration::days(RETOUCH_WINDOW_DAYS);
        let retouched = today
            .iter()
            .filter(|path| {
                file_touch_days
                    .get(*path)
                    .map(|days| days.range(window_start..date).next().is_some())
                    .unwrap_or(false)
            })
            .count();
        stability.retouch_rate = retouched as f64 / today.len() as f64;
    }
    stability
}

fn ownership_for_day(
    date: NaiveDate,
    day_commits: &[&CommitData],
    file_day_authors: &HashMap<&str, Vec<(NaiveDate, &str)>>,
    file_first_touch: &HashMap<&str, NaiveDate>,
) -> DailyOwnership {
    let mut ownership = DailyOwnership {
        date,
        ..Default::default()
    };
    let today = touched_files(day_commits);
    if today.is_empty() {
        return ownership;
    }

    let window_start = date - Duration::days(OWNERSHIP_WINDOW_DAYS);
    let mut author_count_sum = 0usize;
    for path in &today {
        if file_first_touch.get(path) == Some(&date) {
            ownership.new_files += 1;
        }
        let recent_authors: BTreeSet<&str> = file_day_authors
            .get(path)
            .map(|pairs| {
                pairs
                    .iter()
                    .filter(|(day, _)| *day > window_start && *day <= date)
                    .map(|(_, author)| *author)
                    .collect()
            })
            .unwrap_or_default();
        if recent_authors.len() == 1 {
            ownership.single_owner_files += 1;
        }
        author_count_sum += recent_authors.len();
    }
    ownership.avg_authors_per_file = author_count_sum as f64 / today.len() as f64;
    ownership
}

fn coupling_for_day(date: NaiveDate, day_commits: &[&CommitData]) -> DailyCoupling {
    let mut coupling = DailyCoupling {
        date,
        ..Default::default()
    };
    if day_commits.is_empty() {
        return coupling;
    }
    let pair_sum: u64 = day_commits
        .iter()
        .map(|c| {
            let n = c.files.len() as u64;
            n * n.saturating_sub(1) / 2
        })
        .sum();
    coupling.co_change_density = pair_sum as f64 / day_commits.len() as f64;
    coupling
}

fn hygiene_for_day(date: NaiveDate, day_commits: &[&CommitData]) -> DailyHygiene {
    let mut hygiene = DailyHygiene {
        date,
        ..Default::default()
    };
    if day_commits.is_empty() {
        return hygiene;
    }
    let lengths: Vec<f64> = day_commits
        .iter()
        .map(|c| c.subject.chars().count() as f64)
        .collect();
    hygiene.median_message_length = median(&lengths);
    hygiene.short_messages = day_commits
        .iter()
        .filter(|c| c.subject.chars().count() < SHORT_MESSAGE_LEN)
        .count() as u64;
    hygiene.conventional_commits = day_commits
        .iter()
        .filter(|c| conventional_commit_type(&c.subject).is_some())
        .count() as u64;
    hygiene
}

/// Bucket each day's commit count relative to the busiest day and group
/// consecutive days into ISO-8601 weeks.
fn contribution_graph(flow: &[DailyFlow], max_daily_commits: u64) -> ContributionGraphData {
    let mut graph = ContributionGraphData {
        max_daily_commits,
        ..Default::default()
    };

    for day in flow {
        let iso = day.date.iso_week();
        let cell = ContributionDay {
            date: day.date,
            commits: day.commits,
            intensity: intensity(day.commits, max_daily_commits),
        };
        match graph.weeks.last_mut() {
            Some(week) if week.iso_year == iso.year() && week.iso_week == iso.week() => {
                week.days.push(cell);
            }
            _ => graph.weeks.push(ContributionWeek {
                iso_year: iso.year(),
                iso_week: iso.week(),
                days: vec![cell],
            }),
        }
    }
    graph
}

/// ≥75% of the max → 4, ≥50% → 3, ≥25% → 2, any activity → 1, none → 0.
fn intensity(commits: u64, max: u64) -> u8 {
    if commits == 0 || max == 0 {
        return 0;
    }
    let ratio = commits as f64 / max as f64;
    if ratio >= 0.75 {
        4
    } else if ratio >= 0.5 {
        3
    } else if ratio >= 0.25 {
        2
    } else {
        1
    }
}
