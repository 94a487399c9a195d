// ABOUTME: CLI entry point for sqldump-importer
// ABOUTME: Parses commands and routes to appropriate handlers

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sqldump_importer::commands;
use sqldump_importer::commands::import::TargetOverrides;
use sqldump_importer::target::TargetKind;

#[derive(Parser)]
#[command(name = "sqldump-importer")]
#[command(about = "Index SQL dump files and selectively import one table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-table insert counts and data sizes, sorted ascending by count
    Stats {
        /// Path to the dump file (.sql, .sql.gz, or .sql.bz2)
        dump: PathBuf,
    },
    /// List the tables defined or inserted into by the dump
    Tables {
        /// Path to the dump file (.sql, .sql.gz, or .sql.bz2)
        dump: PathBuf,
    },
    /// Replay one table's CREATE TABLE and INSERT statements into a target database
    Import {
        /// Path to the dump file (.sql, .sql.gz, or .sql.bz2)
        dump: PathBuf,
        /// Table to import
        #[arg(long)]
        table: String,
        /// Target database backend
        #[arg(long, value_enum)]
        db_kind: Option<TargetKind>,
        /// Database host (default: localhost)
        #[arg(long)]
        host: Option<String>,
        /// Database port (default: backend's standard port)
        #[arg(long)]
        port: Option<u16>,
        /// Database username
        #[arg(long)]
        username: Option<String>,
        /// Database password
        #[arg(long)]
        password: Option<String>,
        /// Database name
        #[arg(long)]
        database: Option<String>,
        /// TOML file with connection defaults; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Skip the CREATE TABLE and replay only the INSERT statements
        #[arg(long)]
        data_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { dump } => commands::stats(&dump).await,
        Commands::Tables { dump } => commands::tables(&dump).await,
        Commands::Import {
            dump,
            table,
            db_kind,
            host,
            port,
            username,
            password,
            database,
            config,
            data_only,
        } => {
            let overrides = TargetOverrides {
                db_kind,
                host,
                port,
                username,
                password,
                database,
            };
            commands::import(&dump, &table, overrides, config.as_deref(), data_only).await
        }
    }
}
