use pretty_assertions::assert_eq;

use super::finalize::{enhance, finalize};
use super::parser::{CommitFrameParser, ParseOutcome, ParserState, FIELD_SEPARATOR, RECORD_SEPARATOR};

const FS: char = '\u{1f}';
const RS: char = '\u{1e}';

/// Build one framed record: header fields joined by the field separator,
/// a newline closing the parents field, then numstat lines.
fn record(
    hash: &str,
    author: &str,
    email: &str,
    date: &str,
    subject: &str,
    body: &str,
    parents: &str,
    stats: &[&str],
) -> String {
    let mut out = String::new();
    out.push(RS);
    let short = &hash[..hash.len().min(7)];
    out.push_str(&format!(
        "{hash}{FS}{short}{FS}{author}{FS}{email}{FS}{date}{FS}{subject}{FS}{body}{FS}{parents}\n"
    ));
    for line in stats {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn sample_stream() -> String {
    let mut stream = String::new();
    stream.push_str(&record(
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "Alice Dev",
        "alice@example.com",
        "2024-03-01T10:15:00+01:00",
        "feat: streaming parser",
        "A body line.\nAnother body line.\n\nCo-authored-by: Bob <bob@example.com>",
        "1111111111111111111111111111111111111111",
        &["10\t2\tsrc/parser.rs", "3\t0\tsrc/lib.rs"],
    ));
    stream.push_str(&record(
        "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        "Bob Dev",
        "bob@example.com",
        "2024-03-02T18:45:00+01:00",
        "fix: off-by-one in frame cut",
        "",
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        &["-\t-\tassets/logo.png", "1\t1\tsrc/parser.rs"],
    ));
    stream.push_str(&record(
        "cccccccccccccccccccccccccccccccccccccccc",
        "Alice Dev",
        "alice@example.com",
        "2024-03-03T09:00:00+01:00",
        "Merge branch 'fix'",
        "",
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        &[],
    ));
    stream
}

fn parse_in_chunks(stream: &[u8], chunk_size: usize) -> ParseOutcome {
    let mut parser = CommitFrameParser::new();
    for chunk in stream.chunks(chunk_size) {
        parser.feed(chunk);
    }
    parser.finish()
}

#[test]
fn parses_a_complete_stream() {
    let stream = sample_stream();
    let outcome = parse_in_chunks(stream.as_bytes(), stream.len());

    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.commits.len(), 3);

    let first = &outcome.commits[0];
    assert_eq!(first.author, "Alice Dev");
    assert_eq!(first.subject, "feat: streaming parser");
    assert_eq!(first.files.len(), 2);
    assert_eq!(first.files[0].insertions, 10);
    assert_eq!(first.files[0].deletions, 2);

    let second = &outcome.commits[1];
    assert!(second.files[0].is_binary);
    assert_eq!(second.files[0].insertions, 0);

    let merge = &outcome.commits[2];
    assert_eq!(merge.parents.len(), 2);
    assert!(merge.files.is_empty());
}

#[test]
fn chunk_boundary_invariance() {
    let stream = sample_stream();
    let whole = parse_in_chunks(stream.as_bytes(), stream.len());

    for chunk_size in [1, 2, 3, 7, 16, 64, 1024] {
        let chunked = parse_in_chunks(stream.as_bytes(), chunk_size);
        assert_eq!(
            whole.commits, chunked.commits,
            "commits differ at chunk size {chunk_size}"
        );
        assert_eq!(
            whole.warnings, chunked.warnings,
            "warnings differ at chunk size {chunk_size}"
        );
    }
}

#[test]
fn body_with_embedded_stat_lookalike_is_not_split() {
    // The body contains a line that looks exactly like a numstat line and
    // an embedded newline; only the newline after the 7th separator may
    // close the header.
    let stream = record(
        "dddddddddddddddddddddddddddddddddddddddd",
        "Alice Dev",
        "alice@example.com",
        "2024-03-04T12:00:00+00:00",
        "docs: explain framing",
        "Looks like numstat:\n12\t3\tfake.rs\nbut it is body text.",
        "cccccccccccccccccccccccccccccccccccccccc",
        &["5\t0\tREADME.md"],
    );
    for chunk_size in [1, 9, stream.len()] {
        let outcome = parse_in_chunks(stream.as_bytes(), chunk_size);
        assert_eq!(outcome.commits.len(), 1, "chunk size {chunk_size}");
        let commit = &outcome.commits[0];
        assert!(commit.body.contains("12\t3\tfake.rs"));
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.files[0].path, "README.md");
    }
}

#[test]
fn short_header_yields_one_warning_and_stream_recovers() {
    // Only 6 field separators (7 fields): malformed.
    let mut stream = String::new();
    stream.push(RS);
    stream.push_str(&format!(
        "badbadbadbadbadbadbadbadbadbadbadbadbadb{FS}badbadb{FS}Eve{FS}eve@example.com{FS}2024-03-01T00:00:00+00:00{FS}broken{FS}rest\n"
    ));
    stream.push_str(&sample_stream());

    let outcome = parse_in_chunks(stream.as_bytes(), 11);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("expected 8 header fields"));
    assert_eq!(outcome.commits.len(), 3);
}

#[test]
fn unparsable_date_yields_warning_and_skips_record() {
    let mut stream = record(
        "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
        "Eve",
        "eve@example.com",
        "not-a-date",
        "fix: clock",
        "",
        "",
        &[],
    );
    stream.push_str(&sample_stream());

    let outcome = parse_in_chunks(stream.as_bytes(), 5);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("unparsable date"));
    assert_eq!(outcome.commits.len(), 3);
}

#[test]
fn trailing_blank_lines_are_tolerated_silently() {
    let mut stream = sample_stream();
    stream.push_str("\n\n   \n");
    let outcome = parse_in_chunks(stream.as_bytes(), 13);
    assert_eq!(outcome.commits.len(), 3);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn leading_noise_before_first_record_is_dropped() {
    let mut stream = String::from("warning: some preamble\n");
    stream.push_str(&sample_stream());
    let outcome = parse_in_chunks(stream.as_bytes(), 4);
    assert_eq!(outcome.commits.len(), 3);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn parser_state_reflects_suspension_point() {
    let stream = sample_stream();
    let bytes = stream.as_bytes();

    let mut parser = CommitFrameParser::new();
    assert_eq!(parser.state(), ParserState::AwaitingRecordStart);

    // Feed up to the middle of the header (before the 7th separator).
    let sep_positions: Vec<usize> = bytes
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == FIELD_SEPARATOR)
        .map(|(i, _)| i)
        .collect();
    parser.feed(&bytes[..sep_positions[3]]);
    assert_eq!(parser.state(), ParserState::AwaitingHeaderComplete);

    // Feed through the 7th separator but stop before the parents newline.
    let after_seventh = sep_positions[6] + 1;
    parser.feed(&bytes[sep_positions[3]..after_seventh]);
    assert_eq!(parser.state(), ParserState::AwaitingParentsTerminator);

    // The rest of the stream completes all three records.
    parser.feed(&bytes[after_seventh..]);
    let outcome = parser.finish();
    assert_eq!(outcome.commits.len(), 3);
}

#[test]
fn empty_stream_produces_nothing() {
    let outcome = parse_in_chunks(b"", 1);
    assert!(outcome.commits.is_empty());
    assert!(outcome.warnings.is_empty());

    let mut parser = CommitFrameParser::new();
    parser.feed(&[RECORD_SEPARATOR]);
    let outcome = parser.finish();
    assert!(outcome.commits.is_empty());
    assert!(outcome.warnings.is_empty());
}

#[test]
fn finalized_totals_match_file_sums() {
    let stream = sample_stream();
    let outcome = parse_in_chunks(stream.as_bytes(), 17);
    for raw in outcome.commits {
        let commit = finalize(raw);
        assert_eq!(
            commit.insertions,
            commit.files.iter().map(|f| f.insertions).sum::<u64>()
        );
        assert_eq!(
            commit.deletions,
            commit.files.iter().map(|f| f.deletions).sum::<u64>()
        );
        assert_eq!(commit.files_changed, commit.files.len());
    }
}

#[test]
fn finalize_and_enhance_full_pipeline() {
    let stream = sample_stream();
    let outcome = parse_in_chunks(stream.as_bytes(), 32);

    let mut commits: Vec<_> = outcome.commits.into_iter().map(finalize).collect();
    for commit in &mut commits {
        enhance(commit).unwrap();
    }

    assert!(commits[0].is_co_authored);
    assert_eq!(commits[0].co_authors[0].name, "Bob");
    assert!(commits[2].is_merge);
    assert_eq!(
        commits[2].category,
        Some(crate::types::CommitCategory::Merge)
    );
}
