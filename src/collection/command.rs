//! # Log Source Invoker
//!
//! Spawns the external `git log` command with a parser-friendly,
//! delimiter-framed output format and hands its standard output to the
//! frame parser as a byte stream. Process-level failures (spawn failure,
//! non-zero exit) are fatal; everything downstream of the pipe is the
//! parser's concern.
//!
//! The parser's contract depends only on the record/field separator
//! framing, not on git's flag syntax, so this module is the single place
//! that knows how the stream is produced.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use git2::{BranchType, Repository};
use log::debug;
use tokio::process::{Child, Command};

use crate::config::LogFilters;
use crate::error::{Error, Result};

/// Pretty format emitted per commit: a record separator (0x1E), then the
/// 8 header fields (full hash, short hash, author name, author email,
/// strict-ISO author date, subject, body, parent hashes) joined by the
/// field separator (0x1F). Numstat lines follow on their own lines.
pub const LOG_FORMAT: &str =
    "--pretty=format:%x1e%H%x1f%h%x1f%an%x1f%ae%x1f%aI%x1f%s%x1f%b%x1f%P";

/// Resolve the repository that contains `path`.
///
/// Failure here is fatal for the whole run: there is nothing to analyze.
pub fn discover_repository(path: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(path).map_err(|source| Error::InvalidRepository {
        path: path.to_path_buf(),
        source,
    })?;
    match repo.workdir() {
        Some(dir) => Ok(dir.to_path_buf()),
        // Bare repository: the git dir itself is the anchor
        None => Ok(repo.path().to_path_buf()),
    }
}

/// List local branch names, with `main`/`master` sorted to the front so a
/// host offering a branch picker gets a sensible default.
pub async fn available_branches(path: &Path) -> Result<Vec<String>> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&path).map_err(|source| Error::InvalidRepository {
            path: path.clone(),
            source,
        })?;
        let mut names = Vec::new();
        for (branch, _) in repo.branches(Some(BranchType::Local))?.flatten() {
            if let Ok(Some(name)) = branch.name() {
                names.push(name.to_string());
            }
        }
        names.sort();
        if let Some(idx) = names.iter().position(|n| n == "main") {
            names.swap(0, idx);
        } else if let Some(idx) = names.iter().position(|n| n == "master") {
            names.swap(0, idx);
        }
        Ok(names)
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

/// A configured, not-yet-spawned `git log` invocation.
#[derive(Debug, Clone)]
pub struct GitLogCommand {
    root: PathBuf,
    args: Vec<String>,
}

impl GitLogCommand {
    /// Build the argument list for a repository root and filter set.
    pub fn new(root: &Path, filters: &LogFilters) -> Self {
        let mut args = vec![
            "--no-pager".to_string(),
            "log".to_string(),
            "--numstat".to_string(),
            // Detect renames so numstat reports the arrow path forms
            "-M".to_string(),
            LOG_FORMAT.to_string(),
        ];
        if let Some(since) = filters.since {
            args.push(format!("--since={since}"));
        }
        if let Some(until) = filters.until {
            args.push(format!("--until={until}"));
        }
        if let Some(author) = &filters.author {
            args.push(format!("--author={author}"));
        }
        if let Some(branch) = &filters.branch {
            args.push(branch.clone());
        }
        if let Some(path) = &filters.path {
            args.push("--".to_string());
            args.push(path.clone());
        }
        Self {
            root: root.to_path_buf(),
            args,
        }
    }

    /// The argument list that will be passed to `git`.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Spawn the child with piped stdio. Spawn failure is fatal.
    pub fn spawn(&self) -> Result<Child> {
        debug!("running git {} in {}", self.args.join(" "), self.root.display());
        Command::new("git")
            .args(&self.args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Error::SpawnFailed)
    }
}
