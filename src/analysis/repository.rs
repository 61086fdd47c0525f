//! # Repository-Level Statistics
//!
//! Whole-history totals, per-language breakdown, the churn-based bus
//! factor, and the composite health score.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::analysis::authors::AuthorStats;
use crate::analysis::files::FileStats;
use crate::analysis::governance::GovernanceAnalysis;
use crate::types::CommitData;
use crate::utils::math::gini;

/// Extension → language display name for the per-language rollup.
static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("rs", "Rust"),
        ("py", "Python"),
        ("js", "JavaScript"),
        ("jsx", "JavaScript"),
        ("mjs", "JavaScript"),
        ("ts", "TypeScript"),
        ("tsx", "TypeScript"),
        ("java", "Java"),
        ("go", "Go"),
        ("rb", "Ruby"),
        ("c", "C"),
        ("h", "C"),
        ("cc", "C++"),
        ("cpp", "C++"),
        ("hpp", "C++"),
        ("cs", "C#"),
        ("php", "PHP"),
        ("swift", "Swift"),
        ("kt", "Kotlin"),
        ("scala", "Scala"),
        ("sh", "Shell"),
        ("bash", "Shell"),
        ("html", "HTML"),
        ("css", "CSS"),
        ("scss", "CSS"),
        ("md", "Markdown"),
        ("json", "JSON"),
        ("yml", "YAML"),
        ("yaml", "YAML"),
        ("toml", "TOML"),
        ("sql", "SQL"),
    ]
    .into_iter()
    .collect()
});

/// Line churn attributed to one language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    /// Distinct files seen under this language
    pub files: u64,
    /// Insertions plus deletions across the history
    pub lines_changed: u64,
}

/// Whole-repository statistics for one analyzed history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub total_commits: u64,
    pub total_authors: u64,
    pub total_files: u64,
    pub total_churn: u64,
    pub total_insertions: u64,
    pub total_deletions: u64,
    pub first_commit: Option<DateTime<FixedOffset>>,
    pub last_commit: Option<DateTime<FixedOffset>>,
    /// Distinct local calendar days with at least one commit
    pub active_days: u64,
    /// Commits per calendar day across the first–last span
    pub avg_commits_per_day: f64,
    /// Language display name → file/line counts
    pub languages: BTreeMap<String, LanguageStats>,
    /// Churn-based bus factor: the number of top-churn authors needed to
    /// reach 50% of total churn. (The team consistency score carries a
    /// separately defined, commit-count-based bus factor percentage; the
    /// two are intentionally not unified.)
    pub bus_factor: usize,
    /// Composite repository health, in [0, 1]
    pub health_score: f64,
    /// Average governance credit, in [0, 1]
    pub governance_score: f64,
}

/// Reduce the commit set plus the closed author/file/governance passes
/// into the repository rollup.
pub fn repository_stats(
    commits: &[CommitData],
    authors: &[AuthorStats],
    files: &[FileStats],
    governance: &GovernanceAnalysis,
    reference: DateTime<FixedOffset>,
) -> RepositoryStats {
    let mut stats = RepositoryStats {
        total_commits: commits.len() as u64,
        total_authors: authors.len() as u64,
        total_files: files.len() as u64,
        governance_score: governance.overall_score,
        ..Default::default()
    };
    if commits.is_empty() {
        return stats;
    }

    let mut active_days = BTreeSet::new();
    for commit in commits {
        stats.total_insertions += commit.insertions;
        stats.total_deletions += commit.deletions;
        active_days.insert(commit.date.date_naive());

        let newer = stats.last_commit.map_or(true, |d| commit.date > d);
        if newer {
            stats.last_commit = Some(commit.date);
        }
        let older = stats.first_commit.map_or(true, |d| commit.date < d);
        if older {
            stats.first_commit = Some(commit.date);
        }
    }
    stats.total_churn = stats.total_insertions + stats.total_deletions;
    stats.active_days = active_days.len() as u64;

    if let (Some(first), Some(last)) = (stats.first_commit, stats.last_commit) {
        let span_days = (last.date_naive() - first.date_naive()).num_days() + 1;
        if span_days > 0 {
            stats.avg_commits_per_day = commits.len() as f64 / span_days as f64;
        }
    }

    for file in files {
        let language = language_of(&file.path);
        let entry = stats.languages.entry(language.to_string()).or_default();
        entry.files += 1;
        entry.lines_changed += file.churn;
    }

    stats.bus_factor = bus_factor(authors);
    stats.health_score = health_score(&stats, authors, governance, &active_days, reference);
    stats
}

fn language_of(path: &str) -> &'static str {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| LANGUAGES.get(ext.as_str()).copied())
        .unwrap_or("Other")
}

/// Churn-based bus factor: sort authors by churn descending and count how
/// many are needed to accumulate at least half the total churn.
pub fn bus_factor(authors: &[AuthorStats]) -> usize {
    let total: u64 = authors.iter().map(|a| a.churn).sum();
    if total == 0 {
        return 0;
    }
    let mut churns: Vec<u64> = authors.iter().map(|a| a.churn).collect();
    churns.sort_unstable_by(|a, b| b.cmp(a));

    let mut cumulative = 0u64;
    for (i, churn) in churns.iter().enumerate() {
        cumulative += churn;
        // Integer comparison for cumulative ≥ 50% of total
        if cumulative * 2 >= total {
            return i + 1;
        }
    }
    churns.len()
}

/// Equal-weight blend of bus-factor depth (saturating at 4 authors),
/// commit-count equality (1 − Gini), governance, and the share of the
/// trailing 30 days that saw activity.
fn health_score(
    stats: &RepositoryStats,
    authors: &[AuthorStats],
    governance: &GovernanceAnalysis,
    active_days: &BTreeSet<chrono::NaiveDate>,
    reference: DateTime<FixedOffset>,
) -> f64 {
    let bus_component = (stats.bus_factor as f64 / 4.0).min(1.0);

    let commit_counts: Vec<f64> = authors.iter().map(|a| a.commits as f64).collect();
    let equality = 1.0 - gini(&commit_counts);

    let window_start = reference.date_naive() - chrono::Duration::days(29);
    let recent = active_days
        .iter()
        .filter(|&&day| day >= window_start && day <= reference.date_naive())
        .count();
    let recent_activity = recent as f64 / 30.0;

    0.25 * bus_component
        + 0.25 * equality
        + 0.25 * governance.overall_score
        + 0.25 * recent_activity
}
