// ABOUTME: Tables command listing every table discovered in the dump
// ABOUTME: Shows column counts and whether a CREATE TABLE was captured

use anyhow::Result;
use std::path::Path;

use crate::source::DumpSource;

/// Index the dump and list the tables it defines or inserts into
pub async fn tables(dump: &Path) -> Result<()> {
    let source = DumpSource::open(dump)?;
    let index = super::index_with_progress(&source)?;

    if index.is_empty() {
        println!("No tables found in '{}'", dump.display());
        return Ok(());
    }

    let mut entries: Vec<_> = index.entries().collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    println!("Available tables:");
    for entry in entries {
        let schema = if entry.has_schema() {
            format!("{} column(s)", entry.columns.len())
        } else {
            // Inserts referenced it but no complete CREATE TABLE was seen
            "no schema captured".to_string()
        };
        println!(
            "  {:<40} {} / {} insert(s)",
            entry.name, schema, entry.insert_count
        );
    }

    Ok(())
}
