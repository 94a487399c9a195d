// ABOUTME: PostgreSQL executor for statement replay
// ABOUTME: TLS-capable connection setup and single-statement execution

use anyhow::{Context, Result};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Client;

use super::ConnectOptions;

/// Connect to a PostgreSQL server with TLS support
///
/// The connection task is spawned in the background; its errors are logged
/// rather than surfaced, since by then the statement that hit them has
/// already failed with its own error.
///
/// # Errors
///
/// Returns an error with a hint about the likely cause when authentication
/// fails, the database is missing, or the server is unreachable.
pub async fn connect(opts: &ConnectOptions) -> Result<Client> {
    tracing::info!(
        "Connecting to PostgreSQL at {}:{} (database '{}')",
        opts.host,
        opts.port,
        opts.database
    );

    let tls_connector = TlsConnector::builder()
        .build()
        .context("Failed to build TLS connector")?;
    let tls = MakeTlsConnector::new(tls_connector);

    let mut config = tokio_postgres::Config::new();
    config
        .host(&opts.host)
        .port(opts.port)
        .user(&opts.username)
        .password(&opts.password)
        .dbname(&opts.database);

    let (client, connection) = config.connect(tls).await.map_err(|e| {
        let message = e.to_string();
        if message.contains("password authentication failed") {
            anyhow::anyhow!(
                "Authentication failed: invalid username or password for PostgreSQL at {}:{}",
                opts.host,
                opts.port
            )
        } else if message.contains("does not exist") {
            anyhow::anyhow!(
                "Database '{}' does not exist on PostgreSQL at {}:{}.\n\
                 Create it first, e.g.: createdb {}",
                opts.database,
                opts.host,
                opts.port,
                opts.database
            )
        } else if message.contains("Connection refused") || message.contains("timed out") {
            anyhow::anyhow!(
                "Unable to reach PostgreSQL at {}:{}: {}",
                opts.host,
                opts.port,
                message
            )
        } else {
            anyhow::anyhow!("Failed to connect to PostgreSQL: {}", message)
        }
    })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    tracing::debug!("Connected to PostgreSQL");
    Ok(client)
}

/// Execute one statement
///
/// The PostgreSQL protocol requires query text to be valid UTF-8, so a
/// non-UTF-8 span is an explicit error here rather than a silent lossy
/// re-encoding of the dump's bytes.
pub async fn execute(client: &Client, statement: &[u8]) -> Result<()> {
    let statement = std::str::from_utf8(statement)
        .context("Statement is not valid UTF-8; PostgreSQL only accepts UTF-8 query text")?;
    client
        .batch_execute(statement)
        .await
        .context("PostgreSQL rejected statement")?;
    Ok(())
}
