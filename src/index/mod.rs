// ABOUTME: Data model for the dump index built by the scanner
// ABOUTME: Byte ranges, per-table entries, and statistics derivation

pub mod scanner;

pub use scanner::index_dump;

use std::collections::HashMap;

/// Half-open byte span `[start, end)` into the decompressed dump stream
///
/// `end` stays `None` while the statement is still open during the scan; a
/// range that never closed (truncated dump) keeps `end = None` and is not
/// replayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn open(start: u64) -> Self {
        Self { start, end: None }
    }

    pub fn close(&mut self, end: u64) {
        debug_assert!(end >= self.start);
        self.end = Some(end);
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Span length in bytes, `None` while the range is still open
    pub fn len(&self) -> Option<u64> {
        self.end.map(|end| end - self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

/// Everything the scan recorded about one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    /// Column identifiers in declaration order, empty if no schema was seen
    pub columns: Vec<String>,
    /// Span of the full CREATE TABLE statement, `None` if the dump had none
    pub create_range: Option<ByteRange>,
    /// One span per INSERT statement, in file order
    pub insert_ranges: Vec<ByteRange>,
    /// Tracked alongside `insert_ranges` for O(1) statistics
    pub insert_count: u64,
}

impl TableEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            create_range: None,
            insert_ranges: Vec::new(),
            insert_count: 0,
        }
    }

    /// Total bytes of data-insertion statements recorded for this table
    ///
    /// Measured from the actual recorded spans rather than a per-row
    /// constant, so it reflects wide and narrow rows alike. Used only for
    /// display ordering in statistics output.
    pub fn estimated_size_bytes(&self) -> u64 {
        self.insert_ranges
            .iter()
            .filter_map(|range| range.len())
            .sum()
    }

    pub fn has_schema(&self) -> bool {
        self.create_range.is_some_and(|range| range.is_closed())
    }
}

/// One row of statistics output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    pub name: String,
    pub insert_count: u64,
    pub estimated_size_bytes: u64,
}

/// Mapping from table name to its recorded structural metadata
///
/// Built by exactly one pass of [`scanner::index_dump`] and treated as
/// read-only afterwards. Never persisted; every run rebuilds it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DumpIndex {
    tables: HashMap<String, TableEntry>,
}

impl DumpIndex {
    pub fn get(&self, table: &str) -> Option<&TableEntry> {
        self.tables.get(table)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names in alphabetical order
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn entries(&self) -> impl Iterator<Item = &TableEntry> {
        self.tables.values()
    }

    /// Per-table statistics sorted ascending by insert count
    pub fn stats(&self) -> Vec<TableStats> {
        let mut stats: Vec<TableStats> = self
            .tables
            .values()
            .map(|entry| TableStats {
                name: entry.name.clone(),
                insert_count: entry.insert_count,
                estimated_size_bytes: entry.estimated_size_bytes(),
            })
            .collect();
        // Name as a tiebreaker keeps the output stable across runs
        stats.sort_by(|a, b| {
            a.insert_count
                .cmp(&b.insert_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        stats
    }

    /// Fetch or create the entry for `name`
    ///
    /// Creation covers inserts that reference a table whose CREATE TABLE was
    /// never seen, e.g. truncated dumps.
    pub(crate) fn entry_mut(&mut self, name: &str) -> &mut TableEntry {
        self.tables
            .entry(name.to_string())
            .or_insert_with(|| TableEntry::new(name))
    }
}
