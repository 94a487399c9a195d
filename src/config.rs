// ABOUTME: Parses the optional TOML config file with target connection defaults
// ABOUTME: CLI flags always override values loaded from the file

use crate::target::TargetKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct ImportConfig {
    #[serde(default)]
    pub target: TargetDefaults,
}

/// Connection defaults from the `[target]` section
#[derive(Debug, Deserialize, Default)]
pub struct TargetDefaults {
    pub db_kind: Option<TargetKind>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

pub fn load_config(path: &Path) -> Result<ImportConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let parsed: ImportConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse TOML config at {}", path.display()))?;
    Ok(parsed)
}
