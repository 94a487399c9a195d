// ABOUTME: Import command replaying one table's schema and data into a target
// ABOUTME: Resolves connection settings from CLI flags and the optional config file

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{self, TargetDefaults};
use crate::replay::{replay_data, replay_schema};
use crate::source::DumpSource;
use crate::target::{ConnectOptions, TargetConnection, TargetKind};
use crate::utils::validate_table_name;

/// Connection settings given on the command line; any missing value falls
/// back to the config file, then to a built-in default where one exists
#[derive(Debug, Default, Clone)]
pub struct TargetOverrides {
    pub db_kind: Option<TargetKind>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

/// Index the dump, then replay `table`'s CREATE TABLE and INSERTs
///
/// Schema replay failure aborts before any data is sent; per-statement data
/// failures are logged and skipped. Ctrl-C stops the replay between
/// statements, leaving already-applied rows in place.
pub async fn import(
    dump: &Path,
    table: &str,
    overrides: TargetOverrides,
    config_path: Option<&Path>,
    data_only: bool,
) -> Result<()> {
    validate_table_name(table)?;

    let defaults = match config_path {
        Some(path) => config::load_config(path)?.target,
        None => TargetDefaults::default(),
    };
    let (kind, opts) = resolve_target(overrides, defaults)?;

    let source = DumpSource::open(dump)?;
    let index = super::index_with_progress(&source)?;

    if !index.contains(table) {
        let available = index.table_names().join(", ");
        bail!(
            "Table '{}' does not appear in '{}'.\nAvailable tables: {}",
            table,
            dump.display(),
            if available.is_empty() {
                "(none)"
            } else {
                available.as_str()
            }
        );
    }

    let mut connection = TargetConnection::connect(kind, &opts).await?;

    // Ctrl-C requests a stop between statements rather than killing the
    // process mid-statement
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl-C received; finishing the current statement then stopping");
            flag.store(true, Ordering::Relaxed);
        }
    });

    if !data_only {
        replay_schema(&index, &source, table, &mut connection)
            .await
            .with_context(|| format!("Schema import for '{}' failed; data import skipped", table))?;
    }

    let insert_count = index.get(table).map(|e| e.insert_count).unwrap_or(0);
    let pb = ProgressBar::new(insert_count);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} statements ({percent}%)",
            )
            .unwrap()
            .progress_chars("=>-"),
    );

    let report = replay_data(&index, &source, table, &mut connection, &cancel, Some(&pb)).await?;
    pb.finish_and_clear();

    connection.close().await?;

    if report.cancelled {
        println!(
            "Import of '{}' cancelled: {} statement(s) applied, {} failed, {} not attempted",
            table,
            report.applied,
            report.failed,
            insert_count - report.applied - report.failed
        );
    } else if report.failed > 0 {
        println!(
            "Imported '{}' with warnings: {} statement(s) applied, {} failed (see log)",
            table, report.applied, report.failed
        );
    } else {
        println!(
            "Imported '{}': {} statement(s) applied",
            table, report.applied
        );
    }

    Ok(())
}

/// Merge CLI flags over config-file defaults into concrete connect options
///
/// Credentials and the database name have no built-in default; missing ones
/// are a usage error reported before anything touches the dump or the
/// network.
fn resolve_target(
    overrides: TargetOverrides,
    defaults: TargetDefaults,
) -> Result<(TargetKind, ConnectOptions)> {
    let kind = overrides
        .db_kind
        .or(defaults.db_kind)
        .unwrap_or(TargetKind::Mysql);

    let username = overrides
        .username
        .or(defaults.username)
        .context("Missing database username: pass --username or set [target].username")?;
    let password = overrides
        .password
        .or(defaults.password)
        .context("Missing database password: pass --password or set [target].password")?;
    let database = overrides
        .database
        .or(defaults.database)
        .context("Missing database name: pass --database or set [target].database")?;

    let host = overrides
        .host
        .or(defaults.host)
        .unwrap_or_else(|| "localhost".to_string());
    let port = overrides
        .port
        .or(defaults.port)
        .unwrap_or_else(|| kind.default_port());

    Ok((
        kind,
        ConnectOptions {
            host,
            port,
            username,
            password,
            database,
        },
    ))
}
