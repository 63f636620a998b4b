//! catalog-server - REST API over the library catalog
//!
//! `serve` (the default) runs the HTTP API. `relink` matches legacy raw
//! classification codes against the dictionaries; `tables` prints row
//! counts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use catalog_common::config::{
    default_config_path, log_directives, CatalogConfig, CliOverrides, TomlConfig,
};
use catalog_common::db::{init_database, list_tables};
use catalog_server::{build_router, db, AppState};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for catalog-server
#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(about = "Library catalog REST API")]
#[command(version)]
struct Args {
    /// Config file (default: platform config dir/catalog/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<String>,

    /// Log filter, e.g. "info" or "catalog_server=debug"
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long)]
        bind: Option<String>,

        /// Bearer token required on protected routes
        #[arg(long)]
        api_token: Option<String>,
    },
    /// Link raw BBK/UDC/GRNTI codes to dictionary entries
    Relink,
    /// Print every table with its row count
    Tables,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (bind_addr, api_token) = match &args.command {
        Some(Command::Serve { bind, api_token }) => (bind.clone(), api_token.clone()),
        _ => (None, None),
    };

    let config_path = args.config.clone().or_else(default_config_path);
    let (file, file_status) = TomlConfig::read(config_path.as_deref());
    let config = CatalogConfig::resolve(
        CliOverrides {
            database_path: args.database.clone(),
            bind_addr,
            api_token,
            log_level: args.log_level.clone(),
        },
        file,
    );

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = log_directives(
        args.log_level.as_deref(),
        rust_log.as_deref(),
        &config.log_level,
    );
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .init();

    info!(
        "Starting catalog-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    file_status.log();
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match args.command.unwrap_or(Command::Serve {
        bind: None,
        api_token: None,
    }) {
        Command::Serve { .. } => serve(config, pool).await,
        Command::Relink => {
            let report = db::relink_raw_codes(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Tables => {
            for table in list_tables(&pool).await? {
                println!("{:<20} {}", table.name, table.row_count);
            }
            Ok(())
        }
    }
}

async fn serve(config: CatalogConfig, pool: sqlx::SqlitePool) -> Result<()> {
    if config.api_token.is_some() {
        info!("Bearer authentication enabled");
    } else {
        warn!("No API token configured: authentication disabled");
    }

    let state = AppState::new(pool, config.api_token);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("catalog-server listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
