// ABOUTME: Target database connections for statement replay
// ABOUTME: One enum over MySQL and PostgreSQL executors behind a common sink trait

pub mod mysql;
pub mod postgres;

use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;

/// Which database backend to replay into
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Mysql,
    Postgres,
}

impl TargetKind {
    pub fn default_port(self) -> u16 {
        match self {
            TargetKind::Mysql => 3306,
            TargetKind::Postgres => 5432,
        }
    }
}

/// Connection parameters resolved from CLI flags and the optional config file
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

/// Anything that can execute one SQL statement at a time
///
/// The replayer is generic over this so tests can substitute a recording
/// sink for a live database connection. Statements are the raw bytes cut
/// out of the dump; backends that need text decide how strictly to decode.
#[allow(async_fn_in_trait)]
pub trait StatementSink {
    async fn execute(&mut self, statement: &[u8]) -> Result<()>;
}

/// An open session against the target database
pub enum TargetConnection {
    Mysql(mysql_async::Conn),
    Postgres(tokio_postgres::Client),
}

impl TargetConnection {
    /// Connect to the chosen backend
    pub async fn connect(kind: TargetKind, opts: &ConnectOptions) -> Result<Self> {
        match kind {
            TargetKind::Mysql => Ok(TargetConnection::Mysql(mysql::connect(opts).await?)),
            TargetKind::Postgres => Ok(TargetConnection::Postgres(postgres::connect(opts).await?)),
        }
    }

    /// Close the session
    ///
    /// MySQL wants an explicit disconnect; the PostgreSQL client shuts its
    /// connection task down on drop.
    pub async fn close(self) -> Result<()> {
        match self {
            TargetConnection::Mysql(conn) => mysql::disconnect(conn).await,
            TargetConnection::Postgres(_) => Ok(()),
        }
    }
}

impl StatementSink for TargetConnection {
    async fn execute(&mut self, statement: &[u8]) -> Result<()> {
        match self {
            TargetConnection::Mysql(conn) => mysql::execute(conn, statement).await,
            TargetConnection::Postgres(client) => postgres::execute(client, statement).await,
        }
    }
}
