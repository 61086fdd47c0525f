//! # Commit Message Governance
//!
//! Scores how disciplined the commit history is about message hygiene.
//! Each commit earns partial credit for the traits a reviewable history
//! has; the repository score is the average over all commits.

use serde::{Deserialize, Serialize};

use crate::types::CommitData;
use crate::utils::messages::{conventional_commit_type, is_revert, is_wip, references_issue};

/// Credit awarded per trait. The maximum a commit can earn is 0.95.
const CONVENTIONAL_CREDIT: f64 = 0.4;
const ISSUE_REF_CREDIT: f64 = 0.25;
const LENGTH_CREDIT: f64 = 0.15;
const NOT_WIP_CREDIT: f64 = 0.1;
const NOT_REVERT_CREDIT: f64 = 0.05;

/// Subject lengths considered review-friendly.
const MIN_SUBJECT_LEN: usize = 10;
const MAX_SUBJECT_LEN: usize = 72;

/// Aggregate governance picture for one history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceAnalysis {
    /// Average per-commit credit, in [0, 1]
    pub overall_score: f64,
    /// Commits inspected
    pub total_commits: u64,
    /// Commits with a conventional-commit subject
    pub conventional_commits: u64,
    /// Commits referencing an issue or ticket token
    pub with_issue_reference: u64,
    /// Commits whose subject length falls in the 10–72 band
    pub good_length: u64,
    /// Work-in-progress markers
    pub wip_commits: u64,
    /// Reverts
    pub revert_commits: u64,
}

/// Partial credit for one commit, in [0, 0.95].
pub fn commit_credit(commit: &CommitData) -> f64 {
    let mut credit = 0.0;
    if conventional_commit_type(&commit.subject).is_some() {
        credit += CONVENTIONAL_CREDIT;
    }
    if references_issue(&commit.message()) {
        credit += ISSUE_REF_CREDIT;
    }
    if has_good_length(&commit.subject) {
        credit += LENGTH_CREDIT;
    }
    if !is_wip(&commit.subject) {
        credit += NOT_WIP_CREDIT;
    }
    if !is_revert(&commit.subject) {
        credit += NOT_REVERT_CREDIT;
    }
    credit
}

fn has_good_length(subject: &str) -> bool {
    let len = subject.chars().count();
    (MIN_SUBJECT_LEN..=MAX_SUBJECT_LEN).contains(&len)
}

/// Average the per-commit credit over a history. Zero commits score 0.
pub fn governance_analysis(commits: &[CommitData]) -> GovernanceAnalysis {
    let mut analysis = GovernanceAnalysis {
        total_commits: commits.len() as u64,
        ..Default::default()
    };
    if commits.is_empty() {
        return analysis;
    }

    let mut credit_sum = 0.0;
    for commit in commits {
        credit_sum += commit_credit(commit);
        if conventional_commit_type(&commit.subject).is_some() {
            analysis.conventional_commits += 1;
        }
        if references_issue(&commit.message()) {
            analysis.with_issue_reference += 1;
        }
        if has_good_length(&commit.subject) {
            analysis.good_length += 1;
        }
        if is_wip(&commit.subject) {
            analysis.wip_commits += 1;
        }
        if is_revert(&commit.subject) {
            analysis.revert_commits += 1;
        }
    }
    analysis.overall_score = credit_sum / commits.len() as f64;
    analysis
}
