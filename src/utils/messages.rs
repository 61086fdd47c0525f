//! Commit-message inspection helpers shared by the enhancement pass and
//! the governance scorer. All checks are structural string scans; no
//! regular expressions.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// The conventional-commit type vocabulary.
pub static CONVENTIONAL_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore",
        "revert",
    ]
    .into_iter()
    .collect()
});

/// Extract the conventional-commit type from a subject line, if the line
/// follows the `type(scope)!: summary` shape with a known type.
pub fn conventional_commit_type(subject: &str) -> Option<&'static str> {
    let colon = subject.find(':')?;
    if colon == 0 {
        return None;
    }
    let mut head = subject[..colon].trim();

    head = head.strip_suffix('!').unwrap_or(head);
    if let Some(open) = head.find('(') {
        if !head.ends_with(')') {
            return None;
        }
        head = &head[..open];
    }
    if head.is_empty() || !head.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let lowered = head.to_ascii_lowercase();
    CONVENTIONAL_TYPES.get(lowered.as_str()).copied()
}

/// Whether the text references an issue or ticket: `#123` or an
/// uppercase project key like `PROJ-42`.
pub fn references_issue(text: &str) -> bool {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
            return true;
        }
        if b == b'-' && i >= 2 && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
            // At least two uppercase letters immediately before the dash
            let key_len = bytes[..i]
                .iter()
                .rev()
                .take_while(|c| c.is_ascii_uppercase())
                .count();
            if key_len >= 2 {
                return true;
            }
        }
    }
    false
}

/// Whether the subject is a work-in-progress marker.
pub fn is_wip(subject: &str) -> bool {
    let lowered = subject.to_ascii_lowercase();
    if lowered.contains("[wip]") {
        return true;
    }
    let trimmed = lowered.trim_start();
    match trimmed.strip_prefix("wip") {
        // "wip", "wip:", "wip - stuff", but not "wipe"
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
        None => false,
    }
}

/// Whether the subject reverts another commit.
pub fn is_revert(subject: &str) -> bool {
    subject.trim_start().to_ascii_lowercase().starts_with("revert")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_types_are_recognized() {
        assert_eq!(conventional_commit_type("feat: add parser"), Some("feat"));
        assert_eq!(
            conventional_commit_type("fix(parser): handle empty body"),
            Some("fix")
        );
        assert_eq!(
            conventional_commit_type("refactor!: drop old api"),
            Some("refactor")
        );
        assert_eq!(conventional_commit_type("FEAT: shouting"), Some("feat"));
    }

    #[test]
    fn non_conventional_subjects_are_rejected() {
        assert_eq!(conventional_commit_type("add parser"), None);
        assert_eq!(conventional_commit_type("wip: stuff"), None);
        assert_eq!(conventional_commit_type(": empty type"), None);
        assert_eq!(conventional_commit_type("feat(scope: unbalanced"), None);
    }

    #[test]
    fn issue_references() {
        assert!(references_issue("fix login loop (#482)"));
        assert!(references_issue("JIRA-123: do the thing"));
        assert!(!references_issue("no reference here"));
        assert!(!references_issue("dash-2 but lowercase key"));
        assert!(!references_issue("trailing hash #"));
    }

    #[test]
    fn wip_and_revert_markers() {
        assert!(is_wip("WIP: parser"));
        assert!(is_wip("save point [wip]"));
        assert!(!is_wip("fix: wipe cache"));
        assert!(is_revert("Revert \"feat: add parser\""));
        assert!(!is_revert("fix revert logic"));
    }
}
