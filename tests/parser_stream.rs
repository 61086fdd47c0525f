//! Chunk-boundary invariance over raw byte streams: parsing the same
//! stream split into 1-byte chunks, N-byte chunks, or fed whole must
//! produce identical commits and warnings.

use gitpulse::collection::{CommitFrameParser, ParseOutcome};

const RS: char = '\u{1e}';
const FS: char = '\u{1f}';

/// Deterministic synthetic stream: `count` commits with multi-line
/// bodies, renames, binary files, and a couple of deliberately malformed
/// records sprinkled in.
fn build_stream(count: usize) -> Vec<u8> {
    let mut stream = String::new();
    for i in 0..count {
        if i % 25 == 24 {
            // Malformed record: only five header fields.
            stream.push(RS);
            stream.push_str(&format!("zz{i}{FS}zz{FS}Broken{FS}broken@x.com{FS}oops\n"));
            continue;
        }

        let hash = format!("{i:040x}");
        let short = &hash[..7];
        let author = if i % 3 == 0 { "Alice" } else { "Bob" };
        let email = if i % 3 == 0 { "alice@x.com" } else { "bob@x.com" };
        let day = (i % 27) + 1;
        let date = format!("2024-01-{day:02}T{:02}:15:00+02:00", i % 24);
        let subject = format!("feat: change number {i}");
        let body = if i % 4 == 0 {
            format!("Body for {i}.\nSecond line.\n\nCo-authored-by: Pair <pair@x.com>")
        } else {
            String::new()
        };
        let parents = if i % 10 == 0 {
            format!("{:040x} {:040x}", i + 1, i + 2)
        } else {
            format!("{:040x}", i + 1)
        };

        stream.push(RS);
        stream.push_str(&format!(
            "{hash}{FS}{short}{FS}{author}{FS}{email}{FS}{date}{FS}{subject}{FS}{body}{FS}{parents}\n"
        ));
        stream.push_str(&format!("{}\t{}\tsrc/module_{}.rs\n", i % 50, i % 7, i % 13));
        if i % 5 == 0 {
            stream.push_str("-\t-\tassets/blob.bin\n");
        }
        if i % 11 == 0 {
            stream.push_str("3\t3\tsrc/{old => new}/lib.rs\n");
        }
    }
    stream.into_bytes()
}

fn parse_chunked(stream: &[u8], chunk_size: usize) -> ParseOutcome {
    let mut parser = CommitFrameParser::new();
    for chunk in stream.chunks(chunk_size) {
        parser.feed(chunk);
    }
    parser.finish()
}

#[test]
fn identical_results_for_every_chunking() {
    let stream = build_stream(120);
    let whole = parse_chunked(&stream, stream.len());

    // 120 records minus the malformed ones at 24, 49, 74, 99
    assert_eq!(whole.commits.len(), 116);
    assert_eq!(whole.warnings.len(), 4);

    for chunk_size in [1, 2, 3, 5, 8, 13, 64, 256, 4096] {
        let chunked = parse_chunked(&stream, chunk_size);
        assert_eq!(
            whole.commits, chunked.commits,
            "commit mismatch at chunk size {chunk_size}"
        );
        assert_eq!(
            whole.warnings, chunked.warnings,
            "warning mismatch at chunk size {chunk_size}"
        );
    }
}

#[test]
fn renames_and_binaries_survive_chunking() {
    let stream = build_stream(60);
    let outcome = parse_chunked(&stream, 3);

    let renamed: Vec<_> = outcome
        .commits
        .iter()
        .flat_map(|c| &c.files)
        .filter(|f| f.old_path.is_some())
        .collect();
    assert!(!renamed.is_empty());
    assert!(renamed.iter().all(|f| f.path == "src/new/lib.rs"));
    assert!(renamed
        .iter()
        .all(|f| f.old_path.as_deref() == Some("src/old/lib.rs")));

    assert!(outcome
        .commits
        .iter()
        .flat_map(|c| &c.files)
        .any(|f| f.is_binary));
}

#[test]
fn merge_parents_survive_chunking() {
    let stream = build_stream(40);
    for chunk_size in [1, 7, stream.len()] {
        let outcome = parse_chunked(&stream, chunk_size);
        let merges = outcome
            .commits
            .iter()
            .filter(|c| c.parents.len() > 1)
            .count();
        // Records 0, 10, 20, 30 carry two parents
        assert_eq!(merges, 4, "chunk size {chunk_size}");
    }
}
