//! # Common Types
//!
//! The commit-level data model shared by the collection pipeline and the
//! analytics engine, plus the cache key used to memoize whole runs.
//!
//! A [`CommitData`] is immutable once finalized: the collection pipeline
//! builds it, the analyzers only read it.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::config::LogFilters;

/// How a commit touched a file, derived from the numstat line.
///
/// The status is never supplied by the log stream directly: renames are
/// recognized from the arrow form of the path, and the added/deleted split
/// falls out of the insertion/deletion counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// New file (insertions only)
    Added,
    /// Existing file edited in place
    Modified,
    /// File removed (deletions only)
    Deleted,
    /// File moved; `old_path` carries the previous location
    Renamed,
}

/// One file touched by one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path after the commit (the new side of a rename)
    pub path: String,
    /// Previous path, set only for renames
    pub old_path: Option<String>,
    /// Lines added; 0 for binary files
    pub insertions: u64,
    /// Lines deleted; 0 for binary files
    pub deletions: u64,
    /// True when the numstat counts were "-" (binary content)
    pub is_binary: bool,
    /// Derived change kind
    pub status: FileStatus,
}

impl FileChange {
    /// Build a change record, deriving the status from the rename marker
    /// and the insertion/deletion counts.
    pub fn new(
        path: String,
        old_path: Option<String>,
        insertions: u64,
        deletions: u64,
        is_binary: bool,
    ) -> Self {
        let status = if old_path.is_some() {
            FileStatus::Renamed
        } else if insertions > 0 && deletions == 0 {
            FileStatus::Added
        } else if deletions > 0 && insertions == 0 {
            FileStatus::Deleted
        } else {
            FileStatus::Modified
        };
        Self {
            path,
            old_path,
            insertions,
            deletions,
            is_binary,
            status,
        }
    }

    /// Insertions plus deletions for this file.
    pub fn churn(&self) -> u64 {
        self.insertions + self.deletions
    }
}

/// A `Co-authored-by:` trailer parsed out of a commit body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoAuthor {
    /// Display name before the angle brackets
    pub name: String,
    /// Email between the angle brackets (may be empty)
    pub email: String,
}

/// Best-effort classification of a commit message.
///
/// Produced by the enhancement pass; a commit whose enhancement failed
/// simply has no category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitCategory {
    Feature,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
    Merge,
    Other,
}

/// A fully parsed and finalized commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitData {
    /// Full commit hash
    pub hash: String,
    /// Abbreviated hash as emitted by the log command
    pub short_hash: String,
    /// Author display name
    pub author: String,
    /// Author email as recorded in the commit
    pub author_email: String,
    /// Author date with its original UTC offset preserved, so hour-of-day
    /// and calendar-day metrics land in the author's local time
    pub date: DateTime<FixedOffset>,
    /// First line of the message
    pub subject: String,
    /// Everything after the first line (may contain embedded newlines)
    pub body: String,
    /// Parent hashes
    pub parents: Vec<String>,
    /// Sum of insertions over `files`
    pub insertions: u64,
    /// Sum of deletions over `files`
    pub deletions: u64,
    /// Number of entries in `files`
    pub files_changed: usize,
    /// True when the commit has more than one parent
    pub is_merge: bool,
    /// True when at least one co-author trailer was found
    pub is_co_authored: bool,
    /// Parsed co-author trailers
    pub co_authors: Vec<CoAuthor>,
    /// Enhancement output; `None` when enhancement was skipped or failed
    pub category: Option<CommitCategory>,
    /// Per-file stat lines
    pub files: Vec<FileChange>,
}

impl CommitData {
    /// Subject and body joined the way `git log --format=%B` would print
    /// them.
    pub fn message(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n\n{}", self.subject, self.body)
        }
    }

    /// Insertions plus deletions.
    pub fn churn(&self) -> u64 {
        self.insertions + self.deletions
    }
}

/// A key used for caching analysis results based on the log filter set.
///
/// Two runs over the same repository with the same filters produce the same
/// report, so the filter set is the natural cache key.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    /// The filters the cached run was collected with
    pub filters: LogFilters,
}
