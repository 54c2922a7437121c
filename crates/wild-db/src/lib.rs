//! # wild-db
//!
//! Database layer for Wildthoughts. Everything relational (profiles, the
//! animal catalogue, discussions, petitions, lists, votes, signatures) lives
//! in SQLite behind a `sqlx` pool; uploaded pictures live on the local
//! filesystem (see [`storage`]).

pub mod repository;
pub mod sorter;
pub mod storage;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Shared database state passed through Axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Connect using the application configuration.
    pub async fn connect(config: &wild_common::config::AppConfig) -> Result<Self> {
        Self::connect_with(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
    }

    /// Connect to an explicit URL. `sqlite::memory:` needs `max_connections = 1`,
    /// since every connection would otherwise open its own empty database.
    pub async fn connect_with(url: &str, max_connections: u32, min_connections: u32) -> Result<Self> {
        tracing::info!("Connecting to SQLite...");
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect_with(options)
            .await?;

        tracing::info!("Connected to SQLite");
        Ok(Self { pool })
    }

    /// In-memory database with migrations applied. Used by tests.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect_with("sqlite::memory:", 1, 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Health check: verify the database is reachable.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
