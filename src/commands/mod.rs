// ABOUTME: Command implementations for each CLI subcommand
// ABOUTME: Exports stats, tables, and import commands

pub mod import;
pub mod stats;
pub mod tables;

pub use import::import;
pub use stats::stats;
pub use tables::tables;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::index::{index_dump, DumpIndex};
use crate::source::DumpSource;

/// Index the dump with a line-based progress bar
///
/// The line count costs an extra pass over the stream, the same price the
/// original progress display pays; skip straight to [`index_dump`] when no
/// progress is wanted.
pub(crate) fn index_with_progress(source: &DumpSource) -> Result<DumpIndex> {
    let total_lines = source.line_count()?;

    let pb = ProgressBar::new(total_lines);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines ({percent}%)",
            )
            .unwrap()
            .progress_chars("=>-"),
    );

    let index = index_dump(source, Some(&pb))?;
    pb.finish_and_clear();

    Ok(index)
}
