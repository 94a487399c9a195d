// ABOUTME: Single-pass scanner that builds a DumpIndex from a dump stream
// ABOUTME: Recognizes CREATE TABLE, column, and INSERT lines by pattern matching

use anyhow::Result;
use indicatif::ProgressBar;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ByteRange, DumpIndex};
use crate::source::DumpSource;

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?["`]?(?P<table>\w+)["`]?"#)
        .unwrap()
});

static INSERT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^INSERT\s+INTO\s+["`]?(?P<table>\w+)["`]?"#).unwrap());

static COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s+["`]?(?P<column>\w+)["`]?"#).unwrap());

// Matches the ")" line that terminates a CREATE TABLE body, with or without
// trailing table options, e.g. `);` or `) ENGINE=InnoDB DEFAULT CHARSET=utf8;`
static SCHEMA_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\).*;\s*$").unwrap());

// Schema body lines whose first token is one of these declare constraints or
// indexes, not columns
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "PRIMARY",
    "KEY",
    "UNIQUE",
    "CONSTRAINT",
    "FOREIGN",
    "INDEX",
    "FULLTEXT",
    "SPATIAL",
];

fn is_constraint_keyword(token: &str) -> bool {
    CONSTRAINT_KEYWORDS
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(token))
}

/// Scan position threaded through the line-by-line pass
///
/// Holds the "current table" association that free-form dump syntax implies
/// between structural lines, plus at most one open INSERT range. The open
/// range is finalized explicitly at the next structural line or at end of
/// stream, never by incidental side effects of unrelated matches.
#[derive(Debug, Default)]
struct ScanCursor {
    current_table: Option<String>,
    in_schema: bool,
    open_insert: Option<String>,
}

impl ScanCursor {
    /// Close the pending INSERT range, if any, at `end`
    fn finalize_open_insert(&mut self, index: &mut DumpIndex, end: u64) {
        if let Some(table) = self.open_insert.take() {
            if let Some(range) = index.entry_mut(&table).insert_ranges.last_mut() {
                range.close(end);
            }
        }
    }
}

/// Build a [`DumpIndex`] with one forward pass over the dump
///
/// Statement keywords match case-insensitively; identifiers are matched as
/// word characters, case-sensitively, with backtick or double-quote quoting
/// stripped. Lines matching no pattern are skipped without error, which is
/// what lets the pass survive comments, pragmas, LOCK TABLES noise, and
/// outright malformed statements.
///
/// An INSERT that names a table with no prior CREATE TABLE still gets an
/// entry (its `create_range` stays `None`); a CREATE TABLE whose closing
/// line never arrives leaves its range open. Neither case aborts the scan.
pub fn index_dump(source: &DumpSource, progress: Option<&ProgressBar>) -> Result<DumpIndex> {
    let mut reader = source.reader()?;
    let mut index = DumpIndex::default();
    let mut cursor = ScanCursor::default();
    let mut buf = Vec::new();

    loop {
        let line_start = reader.tell();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        let line_end = reader.tell();
        let line = String::from_utf8_lossy(&buf);

        if let Some(pb) = progress {
            pb.inc(1);
        }

        // Structural recognition first; schema-open and insert-open are
        // mutually exclusive per line and both pre-empt column matching.
        if let Some(caps) = CREATE_TABLE_RE.captures(&line) {
            cursor.finalize_open_insert(&mut index, line_start);
            let table = caps["table"].to_string();
            index.entry_mut(&table).create_range = Some(ByteRange::open(line_start));
            cursor.current_table = Some(table);
            cursor.in_schema = true;
            continue;
        }

        if let Some(caps) = INSERT_RE.captures(&line) {
            cursor.finalize_open_insert(&mut index, line_start);
            let table = caps["table"].to_string();
            let entry = index.entry_mut(&table);
            entry.insert_ranges.push(ByteRange::open(line_start));
            entry.insert_count += 1;
            cursor.current_table = Some(table.clone());
            cursor.open_insert = Some(table);
            cursor.in_schema = false;
            continue;
        }

        if cursor.in_schema {
            if let Some(table) = cursor.current_table.clone() {
                // Close wins when a line could read as both close and column
                if SCHEMA_CLOSE_RE.is_match(&line) {
                    if let Some(range) = index.entry_mut(&table).create_range.as_mut() {
                        range.close(line_end);
                    }
                    cursor.in_schema = false;
                    continue;
                }

                if let Some(caps) = COLUMN_RE.captures(&line) {
                    let column = &caps["column"];
                    if !is_constraint_keyword(column) {
                        index.entry_mut(&table).columns.push(column.to_string());
                    }
                }
            }
        }
    }

    // End of stream: the last INSERT closes here; a truncated CREATE TABLE
    // deliberately keeps its open range and fails only on schema replay.
    let final_offset = reader.tell();
    cursor.finalize_open_insert(&mut index, final_offset);

    tracing::info!(
        "Indexed {} table(s) from '{}'",
        index.len(),
        source.path().display()
    );

    Ok(index)
}
