// ABOUTME: Statistics command showing per-table insert counts and sizes
// ABOUTME: Indexes the dump and prints a table sorted ascending by insert count

use anyhow::Result;
use std::path::Path;

use crate::source::DumpSource;
use crate::utils::format_bytes;

/// Index the dump and print per-table statistics
///
/// Tables are listed ascending by insert count so the heaviest tables land
/// at the bottom of the output, next to the prompt.
pub async fn stats(dump: &Path) -> Result<()> {
    let source = DumpSource::open(dump)?;
    let index = super::index_with_progress(&source)?;

    if index.is_empty() {
        println!("No tables found in '{}'", dump.display());
        return Ok(());
    }

    println!("{:<40} {:>12} {:>16}", "Table", "Inserts", "Data size");
    println!("{}", "-".repeat(70));
    for row in index.stats() {
        println!(
            "{:<40} {:>12} {:>16}",
            row.name,
            row.insert_count,
            format_bytes(row.estimated_size_bytes)
        );
    }
    println!(
        "\n{} table(s) in '{}'",
        index.len(),
        dump.display()
    );

    Ok(())
}
