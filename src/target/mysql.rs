// ABOUTME: MySQL executor for statement replay
// ABOUTME: Connection setup and single-statement execution via mysql_async

use anyhow::{Context, Result};
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder};

use super::ConnectOptions;

/// Connect to a MySQL server
///
/// # Errors
///
/// Returns an error if the server is unreachable, credentials are rejected,
/// or the database does not exist.
pub async fn connect(opts: &ConnectOptions) -> Result<Conn> {
    tracing::info!(
        "Connecting to MySQL at {}:{} (database '{}')",
        opts.host,
        opts.port,
        opts.database
    );

    let builder = OptsBuilder::default()
        .ip_or_hostname(opts.host.clone())
        .tcp_port(opts.port)
        .user(Some(opts.username.clone()))
        .pass(Some(opts.password.clone()))
        .db_name(Some(opts.database.clone()));

    let conn = Conn::new(builder).await.with_context(|| {
        format!(
            "Failed to connect to MySQL at {}:{}.\n\
             Check that the server is running, the credentials are valid,\n\
             and database '{}' exists.",
            opts.host, opts.port, opts.database
        )
    })?;

    tracing::debug!("Connected to MySQL");
    Ok(conn)
}

/// Execute one statement, discarding any result set
///
/// The wire protocol carries query text as bytes, so non-UTF-8 payloads
/// (latin-1 columns, binary blobs) pass through untouched.
pub async fn execute(conn: &mut Conn, statement: &[u8]) -> Result<()> {
    conn.query_drop(statement)
        .await
        .context("MySQL rejected statement")?;
    Ok(())
}

/// Cleanly close the connection
pub async fn disconnect(conn: Conn) -> Result<()> {
    conn.disconnect()
        .await
        .context("Failed to close MySQL connection")?;
    Ok(())
}
