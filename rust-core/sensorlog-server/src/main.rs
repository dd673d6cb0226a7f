//! `sensorlog` command-line entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sensorlog::{build_server, logging, storage, AppConfig, SqlRecordRepository};
use sensorlog_core::DatabasePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// sensorlog - temperature and humidity readings over HTTP
#[derive(Parser)]
#[command(name = "sensorlog")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Database URL (overrides config)
    #[arg(long, env = "SENSORLOG_DATABASE_URL")]
    database_url: Option<String>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Start the server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url.clone_from(url);
        }
        match self.verbose {
            0 => {}
            1 => config.logging.level = "info".to_string(),
            2 => config.logging.level = "debug".to_string(),
            _ => config.logging.level = "trace".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init_tracing(&config.logging);

    let pool = DatabasePool::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to open database")?;
    info!(backend = pool.backend(), "Database connected");

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Migrate => storage::migrate(&pool).await.context("migration failed"),
        Commands::Serve => serve(&config, &pool).await,
    };

    pool.close().await;
    result
}

async fn serve(config: &AppConfig, pool: &DatabasePool) -> Result<()> {
    if config.database.run_migrations {
        storage::migrate(pool).await.context("migration failed")?;
    }

    let repository = Arc::new(SqlRecordRepository::new(pool.clone()));
    let server = build_server(
        config.server_config()?,
        &config.server.cors_allow_origin,
        repository,
    )?;

    server.serve().await?;
    info!("Server stopped");
    Ok(())
}
