// ABOUTME: Shared helpers for identifier validation and display formatting
// ABOUTME: Used by the commands and the statistics output

use anyhow::{bail, Result};

/// Validate a table name against the identifier shape the scanner matches
///
/// The scanner only ever records word-character identifiers, so anything
/// else can be rejected up front with a clearer message than "unknown
/// table". This also keeps hostile input out of log lines and error text.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Table name cannot be empty");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        bail!(
            "Invalid table name '{}': only letters, digits, and underscores are allowed",
            name
        );
    }
    Ok(())
}

/// Format a byte count as a human-readable string, e.g. "15.3 MB"
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name_accepts_identifiers() {
        for name in ["users", "user_events", "UserData", "_private", "t2"] {
            assert!(validate_table_name(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_validate_table_name_rejects_non_identifiers() {
        for name in [
            "",
            "users; DROP TABLE users;",
            "users' OR '1'='1",
            "../etc/passwd",
            "sp ace",
        ] {
            assert!(validate_table_name(name).is_err(), "{:?}", name);
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.0 B");
        assert_eq!(format_bytes(500), "500.0 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(1073741824), "1.0 GB");
    }
}
