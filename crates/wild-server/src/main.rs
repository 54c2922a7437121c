//! # Wildthoughts Server
//!
//! Main binary. `wildthoughts serve` (the default) runs the HTTP API and
//! serves uploaded media; `wildthoughts seed` imports the offline seed files
//! and generates sample content.

mod seed;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use wild_api::{AppState, build_router};
use wild_db::{Database, storage::MediaStore};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Import animals and profiles from seed files, then add sample content
    Seed {
        #[arg(long, default_value = "animal.json")]
        animals: PathBuf,
        #[arg(long, default_value = "profile.json")]
        profiles: PathBuf,
        /// Delete all existing rows before importing
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = wild_common::config::init()?;

    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wildthoughts=debug,wild_api=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .init();

    let db = Database::connect(config).await?;
    db.migrate().await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, db).await,
        Command::Seed {
            animals,
            profiles,
            reset,
        } => {
            let report = seed::run(&db, &animals, &profiles, reset).await?;
            tracing::info!(
                profiles = report.profiles,
                animals = report.animals,
                discussions = report.discussions,
                petitions = report.petitions,
                user_lists = report.user_lists,
                "Seed import finished"
            );
            Ok(())
        }
    }
}

async fn serve(config: &wild_common::config::AppConfig, db: Database) -> anyhow::Result<()> {
    tracing::info!("Starting Wildthoughts v{}", env!("CARGO_PKG_VERSION"));

    let storage = MediaStore::new(&config.storage);
    storage.ensure_root().await?;
    tracing::info!(root = %storage.root().display(), "Media storage ready");

    let router = build_router(AppState { db, storage });
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
