//! # Streaming Commit Frame Parser
//!
//! Reassembles discrete commit records from an unbounded sequence of byte
//! chunks produced by the `git log` child process. The log command frames
//! its output with private control bytes: a record separator (0x1E) before
//! each commit header, a field separator (0x1F) between the 8 header
//! fields, and a newline terminating the parents field; numstat lines
//! follow until the next record separator.
//!
//! The parser guarantees that the emitted commits and warnings are a
//! deterministic function of the complete concatenated byte stream,
//! independent of where the transport happened to split its chunks. It
//! suspends only at "not enough data yet" points and never guesses: a
//! record is cut from the buffer only when the next record separator has
//! arrived, or at end of stream.

use chrono::{DateTime, FixedOffset};
use log::{trace, warn};

use crate::types::FileChange;

/// Marks the start of each commit record in the log stream.
pub const RECORD_SEPARATOR: u8 = 0x1E;
/// Separates the 8 header fields within a record.
pub const FIELD_SEPARATOR: u8 = 0x1F;

const FIELD_SEPARATOR_CHAR: char = '\u{1f}';
const HEADER_FIELDS: usize = 8;

/// What the parser is currently waiting for.
///
/// The state is advanced by [`CommitFrameParser::feed`] and exists so the
/// suspension point is explicit rather than implied by ad hoc buffer
/// shuffling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No partial header in the buffer; waiting for a record separator
    /// (either the first one in the stream, or the one that closes the
    /// record currently accumulating numstat lines).
    AwaitingRecordStart,
    /// A record has started but fewer than 7 field separators have been
    /// seen; the header is still incomplete.
    AwaitingHeaderComplete,
    /// All header fields have arrived but the newline that terminates the
    /// parents field has not. The free-text body may contain embedded
    /// newlines, so only a newline *after* the 7th field separator closes
    /// the header.
    AwaitingParentsTerminator,
}

/// A parsed-but-unfinalized commit: header fields plus raw file changes.
///
/// Totals, co-author extraction, and the merge flag are computed by the
/// finalizer, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCommit {
    pub hash: String,
    pub short_hash: String,
    pub author: String,
    pub author_email: String,
    pub date: DateTime<FixedOffset>,
    pub subject: String,
    pub body: String,
    pub parents: Vec<String>,
    pub files: Vec<FileChange>,
}

/// Everything a parse run produced, returned explicitly from
/// [`CommitFrameParser::finish`] so the parser holds no hidden state a
/// caller could forget to read.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Commits in arrival order
    pub commits: Vec<RawCommit>,
    /// Non-fatal problems encountered along the way
    pub warnings: Vec<String>,
}

/// Incremental frame parser over the delimiter-framed log stream.
pub struct CommitFrameParser {
    buf: Vec<u8>,
    /// True once the first record separator has been consumed; from then
    /// on the buffer always begins with (possibly partial) record content.
    started: bool,
    state: ParserState,
    commits: Vec<RawCommit>,
    warnings: Vec<String>,
}

impl Default for CommitFrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitFrameParser {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            started: false,
            state: ParserState::AwaitingRecordStart,
            commits: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Current suspension point.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of commits emitted so far.
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Consume one chunk from the transport and extract every record that
    /// is now complete. Returns the number of commits newly emitted by
    /// this chunk, for progress reporting.
    pub fn feed(&mut self, chunk: &[u8]) -> usize {
        let before = self.commits.len();
        self.buf.extend_from_slice(chunk);

        loop {
            if !self.started {
                // Drop anything before the first record separator; a log
                // stream that matches the framing contract starts with one.
                match self.buf.iter().position(|&b| b == RECORD_SEPARATOR) {
                    Some(i) => {
                        self.buf.drain(..=i);
                        self.started = true;
                    }
                    None => {
                        self.buf.clear();
                        break;
                    }
                }
            }

            // A record is complete once the separator opening the next one
            // has arrived. Partial records stay in the buffer untouched.
            match self.buf.iter().position(|&b| b == RECORD_SEPARATOR) {
                Some(end) => {
                    let record: Vec<u8> = self.buf[..end].to_vec();
                    self.buf.drain(..=end);
                    self.parse_record(&record);
                    self.state = ParserState::AwaitingRecordStart;
                }
                None => {
                    self.state = self.partial_state();
                    trace!("parser suspended in {:?}", self.state);
                    break;
                }
            }
        }

        self.commits.len() - before
    }

    /// Flush the final record (there is no trailing separator after the
    /// last commit) and hand back everything the stream produced.
    pub fn finish(mut self) -> ParseOutcome {
        if self.started && !self.buf.is_empty() {
            let record = std::mem::take(&mut self.buf);
            self.parse_record(&record);
        }
        ParseOutcome {
            commits: self.commits,
            warnings: self.warnings,
        }
    }

    /// Classify why the buffered partial record cannot be cut yet.
    fn partial_state(&self) -> ParserState {
        if self.buf.is_empty() {
            return ParserState::AwaitingRecordStart;
        }
        let mut separators = 0usize;
        for (i, &b) in self.buf.iter().enumerate() {
            if b == FIELD_SEPARATOR {
                separators += 1;
                if separators == HEADER_FIELDS - 1 {
                    // Header fields all present; the parents field runs to
                    // the first newline after this separator.
                    return if self.buf[i..].contains(&b'\n') {
                        ParserState::AwaitingRecordStart
                    } else {
                        ParserState::AwaitingParentsTerminator
                    };
                }
            }
        }
        ParserState::AwaitingHeaderComplete
    }

    /// Parse one complete record. Malformed records produce a warning and
    /// are dropped; the stream continues.
    fn parse_record(&mut self, bytes: &[u8]) {
        // Decode per complete record so invalid UTF-8 can never interact
        // with chunk boundaries.
        let text = String::from_utf8_lossy(bytes);
        if text.trim().is_empty() {
            return;
        }

        let fields: Vec<&str> = text.splitn(HEADER_FIELDS, FIELD_SEPARATOR_CHAR).collect();
        if fields.len() < HEADER_FIELDS {
            let preview: String = text.chars().take(40).collect();
            self.push_warning(format!(
                "malformed commit record: expected {HEADER_FIELDS} header fields, found {} (near '{preview}')",
                fields.len()
            ));
            return;
        }

        let hash = fields[0].trim().to_string();
        let short_hash = fields[1].trim().to_string();
        let author = fields[2].to_string();
        let author_email = fields[3].to_string();
        let subject = fields[5].to_string();
        let body = fields[6].trim().to_string();

        let date = match DateTime::parse_from_rfc3339(fields[4].trim()) {
            Ok(date) => date,
            Err(err) => {
                self.push_warning(format!(
                    "commit {}: unparsable date '{}': {err}",
                    short_display(&hash),
                    fields[4].trim()
                ));
                return;
            }
        };

        // The last split piece holds the parents field up to its newline
        // terminator, then the numstat lines.
        let tail = fields[7];
        let (parents_field, stat_lines) = match tail.find('\n') {
            Some(pos) => (&tail[..pos], &tail[pos + 1..]),
            None => (tail, ""),
        };
        let parents: Vec<String> = parents_field
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let files: Vec<FileChange> = stat_lines
            .lines()
            .filter_map(parse_stat_line)
            .collect();

        self.commits.push(RawCommit {
            hash,
            short_hash,
            author,
            author_email,
            date,
            subject,
            body,
            parents,
            files,
        });
    }

    fn push_warning(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

fn short_display(hash: &str) -> &str {
    if hash.len() >= 7 {
        &hash[..7]
    } else {
        hash
    }
}

/// Parse one numstat line: `insertions\tdeletions\tpath`, where a dash
/// marks binary content. Lines that do not fit the shape (including blank
/// ones) are skipped without a warning.
fn parse_stat_line(line: &str) -> Option<FileChange> {
    if line.trim().is_empty() {
        return None;
    }
    let mut parts = line.splitn(3, '\t');
    let insertions_raw = parts.next()?.trim();
    let deletions_raw = parts.next()?.trim();
    let raw_path = parts.next()?.trim();
    if raw_path.is_empty() {
        return None;
    }

    let (insertions, binary_ins) = parse_count(insertions_raw)?;
    let (deletions, binary_del) = parse_count(deletions_raw)?;
    let (path, old_path) = resolve_rename(raw_path);

    Some(FileChange::new(
        path,
        old_path,
        insertions,
        deletions,
        binary_ins || binary_del,
    ))
}

/// A numstat count is either a non-negative integer or "-" for binary.
fn parse_count(raw: &str) -> Option<(u64, bool)> {
    if raw == "-" {
        return Some((0, true));
    }
    raw.parse::<u64>().ok().map(|n| (n, false))
}

/// Resolve the arrow forms git uses for renames in numstat paths:
/// `old => new` and the brace form `prefix/{old => new}/rest`.
fn resolve_rename(raw: &str) -> (String, Option<String>) {
    const ARROW: &str = " => ";

    if let (Some(open), Some(close)) = (raw.find('{'), raw.rfind('}')) {
        if open < close {
            let inner = &raw[open + 1..close];
            if let Some((old_part, new_part)) = inner.split_once(ARROW) {
                let prefix = &raw[..open];
                let suffix = &raw[close + 1..];
                let old = normalize_path(&format!("{prefix}{old_part}{suffix}"));
                let new = normalize_path(&format!("{prefix}{new_part}{suffix}"));
                return (new, Some(old));
            }
        }
    }

    if let Some((old, new)) = raw.split_once(ARROW) {
        return (new.trim().to_string(), Some(old.trim().to_string()));
    }

    (raw.to_string(), None)
}

/// An empty side of a brace rename leaves a doubled slash behind.
fn normalize_path(path: &str) -> String {
    path.replace("//", "/")
}
