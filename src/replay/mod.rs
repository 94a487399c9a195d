// ABOUTME: Replays indexed byte ranges against a target database
// ABOUTME: Schema replay is all-or-nothing, data replay is best-effort per statement

use anyhow::Result;
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::index::{ByteRange, DumpIndex};
use crate::source::DumpSource;
use crate::target::StatementSink;

/// Replay failures a caller may want to tell apart
///
/// Returned inside `anyhow::Error`; callers that care match with
/// `err.downcast_ref::<ReplayError>()`.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("table '{0}' does not appear in the dump")]
    UnknownTable(String),

    #[error(
        "no complete CREATE TABLE statement was recorded for '{0}' \
         (the dump may be truncated or schema-less)"
    )]
    MissingSchema(String),

    #[error("target rejected the CREATE TABLE statement for '{table}': {message}")]
    SchemaApplyFailed { table: String, message: String },
}

/// Outcome of a data replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayReport {
    /// Statements the target accepted
    pub applied: u64,
    /// Statements the target rejected (logged and skipped)
    pub failed: u64,
    /// True when a cancellation request stopped the replay early
    pub cancelled: bool,
}

/// Re-extract and apply the CREATE TABLE statement for `table`
///
/// Reads exactly the recorded byte span from a fresh reader and submits it
/// as one statement. Schema failure is fatal to the table's import: data
/// cannot land in a table that was never created, so unlike data replay
/// nothing is retried or skipped here.
///
/// # Errors
///
/// [`ReplayError::UnknownTable`] if the table was never indexed,
/// [`ReplayError::MissingSchema`] if its CREATE TABLE range never closed,
/// [`ReplayError::SchemaApplyFailed`] if the target rejects the statement.
pub async fn replay_schema<S: StatementSink>(
    index: &DumpIndex,
    source: &DumpSource,
    table: &str,
    sink: &mut S,
) -> Result<()> {
    let entry = index
        .get(table)
        .ok_or_else(|| ReplayError::UnknownTable(table.to_string()))?;

    let range = entry
        .create_range
        .filter(ByteRange::is_closed)
        .ok_or_else(|| ReplayError::MissingSchema(table.to_string()))?;

    let len = range.len().unwrap_or(0);
    tracing::info!(
        "Replaying CREATE TABLE for '{}' ({} bytes at offset {})",
        table,
        len,
        range.start
    );

    let mut reader = source.reader()?;
    let statement = reader.read_span(range.start, len)?;

    sink.execute(&statement)
        .await
        .map_err(|e| ReplayError::SchemaApplyFailed {
            table: table.to_string(),
            message: format!("{:#}", e),
        })?;

    tracing::info!("Table '{}' created", table);
    Ok(())
}

/// Re-extract and apply every INSERT statement recorded for `table`
///
/// Ranges are visited in file order, which both preserves ordering-sensitive
/// effects (auto-increment assumptions and the like) and keeps every seek
/// forward-only on the shared reader. A rejected statement is logged,
/// counted, and skipped; a handful of bad rows should not abort an
/// otherwise-successful bulk import. `cancel` is checked between statements;
/// already-applied rows stay applied (no rollback).
pub async fn replay_data<S: StatementSink>(
    index: &DumpIndex,
    source: &DumpSource,
    table: &str,
    sink: &mut S,
    cancel: &AtomicBool,
    progress: Option<&ProgressBar>,
) -> Result<ReplayReport> {
    let entry = index
        .get(table)
        .ok_or_else(|| ReplayError::UnknownTable(table.to_string()))?;

    tracing::info!(
        "Replaying {} INSERT statement(s) for '{}'",
        entry.insert_count,
        table
    );

    let mut reader = source.reader()?;
    let mut report = ReplayReport::default();

    for range in &entry.insert_ranges {
        if cancel.load(Ordering::Relaxed) {
            tracing::warn!(
                "Cancellation requested; stopping after {} of {} statement(s) for '{}'",
                report.applied + report.failed,
                entry.insert_count,
                table
            );
            report.cancelled = true;
            break;
        }

        // The scan closes every insert range at the latest at end of
        // stream, so an open one here means the index was tampered with.
        let Some(len) = range.len() else {
            tracing::warn!("Skipping unclosed insert range for '{}'", table);
            report.failed += 1;
            continue;
        };

        let statement = reader.read_span(range.start, len)?;
        match sink.execute(&statement).await {
            Ok(()) => report.applied += 1,
            Err(e) => {
                tracing::warn!("Failed INSERT for '{}': {:#}", table, e);
                report.failed += 1;
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    tracing::info!(
        "Data replay for '{}' done: {} applied, {} failed",
        table,
        report.applied,
        report.failed
    );

    Ok(report)
}
