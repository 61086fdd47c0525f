//! # Error Types
//!
//! Fatal failure modes for a collection/analysis run. Only conditions that
//! abort the whole run live here; recoverable problems (malformed commit
//! records, failed enhancement of a single commit) are collected as warning
//! strings on the result instead of being raised.

use std::path::PathBuf;

/// Errors that abort a collection or analysis run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The given path is not inside a Git repository, or the repository
    /// cannot be opened.
    #[error("not a git repository (or inaccessible): {path}")]
    InvalidRepository {
        /// The path that was probed
        path: PathBuf,
        /// Underlying git2 failure
        #[source]
        source: git2::Error,
    },

    /// The requested branch does not exist in the repository.
    #[error("branch not found: {0}")]
    UnknownBranch(String),

    /// A repository operation (branch listing, ref lookup) failed.
    #[error("git repository error: {0}")]
    Git(#[from] git2::Error),

    /// Spawning the external `git` process failed.
    #[error("failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The `git` process exited with a non-zero status.
    #[error("git exited with {status}: {stderr}")]
    GitFailed {
        /// Exit status reported by the OS
        status: std::process::ExitStatus,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// Reading from the child process pipe failed.
    #[error("i/o error while streaming git output: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration struct failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
