//! # Commit Collection Pipeline
//!
//! Spawns the log command, streams its output through the frame parser in
//! arrival order, and finalizes/enhances each parsed commit. The result
//! is an explicit `{ commits, warnings }` pair: recoverable problems never
//! abort the stream, they accumulate as warnings.

pub mod command;
pub mod finalize;
pub mod parser;

#[cfg(test)]
mod tests;

pub use command::{available_branches, discover_repository, GitLogCommand};
pub use parser::{CommitFrameParser, ParseOutcome, ParserState, RawCommit};

use std::path::Path;

use log::debug;
use tokio::io::AsyncReadExt;

use crate::config::{AnalysisConfig, LogFilters};
use crate::error::{Error, Result};
use crate::types::CommitData;

/// Everything one collection run produced.
#[derive(Debug, Default)]
pub struct CollectedCommits {
    /// Finalized commits in log order (newest first, as git emits them)
    pub commits: Vec<CommitData>,
    /// Parse and enhancement warnings, in the order they occurred
    pub warnings: Vec<String>,
}

/// Collect the commit history of the repository containing `path`.
///
/// Fatal conditions (no repository, spawn failure, non-zero git exit)
/// return an error; malformed records and failed enhancements are
/// reported through [`CollectedCommits::warnings`].
pub async fn collect_commits(
    path: &Path,
    filters: &LogFilters,
    config: &AnalysisConfig,
) -> Result<CollectedCommits> {
    filters.validate()?;
    config.validate()?;

    // git2 calls are blocking; keep them off the async workers like every
    // other repository probe in this crate.
    let root = {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || command::discover_repository(&path))
            .await
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??
    };

    if let Some(branch) = &filters.branch {
        let branches = command::available_branches(&root).await?;
        if !branches.iter().any(|b| b == branch) {
            return Err(Error::UnknownBranch(branch.clone()));
        }
    }

    let mut child = GitLogCommand::new(&root, filters).spawn()?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "no stdout pipe")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "no stderr pipe")))?;

    // Drain stderr concurrently so a chatty git cannot deadlock the pipe.
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf).await;
        buf
    });

    let mut frame_parser = CommitFrameParser::new();
    let mut chunk = vec![0u8; 64 * 1024];
    let mut last_reported = 0usize;
    loop {
        let n = stdout.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        frame_parser.feed(&chunk[..n]);

        let parsed = frame_parser.commit_count();
        if parsed - last_reported >= config.progress_interval {
            last_reported = parsed - parsed % config.progress_interval;
            debug!("parsed {parsed} commits so far");
        }
    }

    let status = child.wait().await?;
    let stderr_bytes = stderr_task.await.unwrap_or_default();
    if !status.success() {
        return Err(Error::GitFailed {
            status,
            stderr: String::from_utf8_lossy(&stderr_bytes).trim().to_string(),
        });
    }

    let outcome = frame_parser.finish();
    let mut warnings = outcome.warnings;
    let mut commits = Vec::with_capacity(outcome.commits.len());
    for raw in outcome.commits {
        let mut commit = finalize::finalize(raw);
        if let Err(err) = finalize::enhance(&mut commit) {
            warnings.push(format!(
                "commit {}: enhancement failed: {err}",
                commit.short_hash
            ));
            commit.category = None;
        }
        commits.push(commit);
    }

    debug!(
        "collected {} commits ({} warnings)",
        commits.len(),
        warnings.len()
    );
    Ok(CollectedCommits { commits, warnings })
}
