//! # Commit Finalizer and Enhancer
//!
//! Turns a [`RawCommit`] from the frame parser into an immutable
//! [`CommitData`]: totals are recomputed from the per-file stat lines
//! (numstat totals emitted elsewhere are never trusted), co-author
//! trailers are extracted from the body, and the merge flag falls out of
//! the parent count.
//!
//! The enhancement pass runs afterwards and is best-effort per commit: a
//! failure is converted into a warning by the collector and the commit is
//! kept un-enhanced. One bad commit never drops the others.

use anyhow::Result;

use crate::collection::parser::RawCommit;
use crate::types::{CoAuthor, CommitCategory, CommitData};
use crate::utils::messages::{conventional_commit_type, is_revert};

/// Compute all derived per-commit fields.
pub fn finalize(raw: RawCommit) -> CommitData {
    let insertions: u64 = raw.files.iter().map(|f| f.insertions).sum();
    let deletions: u64 = raw.files.iter().map(|f| f.deletions).sum();
    let files_changed = raw.files.len();
    let co_authors = extract_co_authors(&raw.body);
    let is_merge = raw.parents.len() > 1;

    CommitData {
        hash: raw.hash,
        short_hash: raw.short_hash,
        author: raw.author,
        author_email: raw.author_email,
        date: raw.date,
        subject: raw.subject,
        body: raw.body,
        parents: raw.parents,
        insertions,
        deletions,
        files_changed,
        is_merge,
        is_co_authored: !co_authors.is_empty(),
        co_authors,
        category: None,
        files: raw.files,
    }
}

/// Best-effort enhancement: classify the commit message. Runs after
/// finalization; the caller records any error as a warning and keeps the
/// commit with `category: None`.
pub fn enhance(commit: &mut CommitData) -> Result<()> {
    commit.category = Some(classify(commit));
    Ok(())
}

/// Map a commit onto its [`CommitCategory`].
///
/// Conventional-commit prefixes win; otherwise a small keyword heuristic
/// over the subject decides. Merge commits short-circuit.
fn classify(commit: &CommitData) -> CommitCategory {
    if commit.is_merge {
        return CommitCategory::Merge;
    }
    if let Some(kind) = conventional_commit_type(&commit.subject) {
        return match kind {
            "feat" => CommitCategory::Feature,
            "fix" => CommitCategory::Fix,
            "docs" => CommitCategory::Docs,
            "style" => CommitCategory::Style,
            "refactor" => CommitCategory::Refactor,
            "perf" => CommitCategory::Perf,
            "test" => CommitCategory::Test,
            "build" => CommitCategory::Build,
            "ci" => CommitCategory::Ci,
            "chore" => CommitCategory::Chore,
            "revert" => CommitCategory::Revert,
            _ => CommitCategory::Other,
        };
    }
    if is_revert(&commit.subject) {
        return CommitCategory::Revert;
    }

    let lowered = commit.subject.to_ascii_lowercase();
    let has = |needle: &str| lowered.contains(needle);
    if has("fix") || has("bug") {
        CommitCategory::Fix
    } else if has("doc") || has("readme") {
        CommitCategory::Docs
    } else if has("refactor") || has("restructur") || has("clean up") || has("cleanup") {
        CommitCategory::Refactor
    } else if has("test") {
        CommitCategory::Test
    } else if has("perf") || has("optimiz") || has("speed up") {
        CommitCategory::Perf
    } else if has("bump") || has("upgrade") || has("dependenc") {
        CommitCategory::Build
    } else if has("add") || has("implement") || has("introduce") || has("support") {
        CommitCategory::Feature
    } else {
        CommitCategory::Other
    }
}

/// Extract `Co-authored-by: Name <email>` trailers from a commit body.
///
/// Structured scan, no regular expressions: the prefix match is
/// case-insensitive, the email sits between angle brackets, and a trailer
/// without brackets contributes a name with an empty email.
fn extract_co_authors(body: &str) -> Vec<CoAuthor> {
    const PREFIX: &str = "co-authored-by:";

    let mut co_authors = Vec::new();
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.len() < PREFIX.len() {
            continue;
        }
        let (head, rest) = trimmed.split_at(PREFIX.len());
        if !head.eq_ignore_ascii_case(PREFIX) {
            continue;
        }

        let rest = rest.trim();
        if rest.is_empty() {
            continue;
        }

        match (rest.find('<'), rest.rfind('>')) {
            (Some(open), Some(close)) if open < close => {
                let name = rest[..open].trim().to_string();
                let email = rest[open + 1..close].trim().to_string();
                co_authors.push(CoAuthor { name, email });
            }
            _ => co_authors.push(CoAuthor {
                name: rest.to_string(),
                email: String::new(),
            }),
        }
    }
    co_authors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(subject: &str, body: &str, parents: &[&str]) -> RawCommit {
        RawCommit {
            hash: "a".repeat(40),
            short_hash: "aaaaaaa".into(),
            author: "Test User".into(),
            author_email: "test@example.com".into(),
            date: "2024-03-04T09:30:00+01:00".parse().unwrap(),
            subject: subject.into(),
            body: body.into(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            files: vec![],
        }
    }

    #[test]
    fn merge_flag_from_parent_count() {
        assert!(!finalize(raw("one parent", "", &["p1"])).is_merge);
        assert!(finalize(raw("two parents", "", &["p1", "p2"])).is_merge);
        assert!(!finalize(raw("root commit", "", &[])).is_merge);
    }

    #[test]
    fn co_author_trailers() {
        let body = "Some explanation.\n\n\
                    Co-authored-by: Alice Dev <alice@example.com>\n\
                    co-authored-by: Bob <bob@example.com>\n\
                    Co-authored-by: Nameless";
        let commit = finalize(raw("feat: pairing", body, &["p1"]));
        assert!(commit.is_co_authored);
        assert_eq!(commit.co_authors.len(), 3);
        assert_eq!(commit.co_authors[0].name, "Alice Dev");
        assert_eq!(commit.co_authors[0].email, "alice@example.com");
        assert_eq!(commit.co_authors[2].name, "Nameless");
        assert_eq!(commit.co_authors[2].email, "");
    }

    #[test]
    fn body_without_trailers() {
        let commit = finalize(raw("fix: thing", "Just a body.", &["p1"]));
        assert!(!commit.is_co_authored);
        assert!(commit.co_authors.is_empty());
    }

    #[test]
    fn enhancement_classifies_conventional_subjects() {
        let mut commit = finalize(raw("feat(parser): streaming frames", "", &["p1"]));
        enhance(&mut commit).unwrap();
        assert_eq!(commit.category, Some(CommitCategory::Feature));

        let mut commit = finalize(raw("Revert \"feat: streaming\"", "", &["p1"]));
        enhance(&mut commit).unwrap();
        assert_eq!(commit.category, Some(CommitCategory::Revert));
    }

    #[test]
    fn enhancement_classifies_merges_first() {
        let mut commit = finalize(raw("Merge branch 'main'", "", &["p1", "p2"]));
        enhance(&mut commit).unwrap();
        assert_eq!(commit.category, Some(CommitCategory::Merge));
    }

    #[test]
    fn enhancement_keyword_fallback() {
        let mut commit = finalize(raw("Fixed the login loop", "", &["p1"]));
        enhance(&mut commit).unwrap();
        assert_eq!(commit.category, Some(CommitCategory::Fix));

        let mut commit = finalize(raw("Weekly housekeeping", "", &["p1"]));
        enhance(&mut commit).unwrap();
        assert_eq!(commit.category, Some(CommitCategory::Other));
    }
}
