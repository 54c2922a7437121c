//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`] or [`init_with`].
pub fn get() -> &'static AppConfig {
    CONFIG.get().expect("Config not initialized. Call wild_common::config::init() first.")
}

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("database.url", "sqlite://wildthoughts.db?mode=rwc")?
        .set_default("database.max_connections", 10)?
        .set_default("database.min_connections", 1)?
        .set_default("auth.access_token_ttl_secs", 3600)? // 1 hour
        .set_default("auth.refresh_token_ttl_secs", 1_209_600)? // 14 days
        .set_default("storage.data_dir", "./media")?
        .set_default("storage.max_upload_bytes", 10_485_760)? // 10MB
        .set_default("pagination.page_size", 20)?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (WILD_SERVER__PORT, WILD_DATABASE__URL, etc.)
        .add_source(
            config::Environment::with_prefix("WILD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Install an already-built configuration. The first call wins; later calls
/// return the configuration that is already installed.
pub fn init_with(app_config: AppConfig) -> &'static AppConfig {
    CONFIG.get_or_init(|| app_config)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://wildthoughts.db?mode=rwc`
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256), should be 256+ bits of entropy
    pub jwt_secret: String,
    /// Access token TTL in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token TTL in seconds
    pub refresh_token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory that holds uploaded pictures, served under `/media`.
    pub data_dir: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    pub page_size: u32,
}
