//! CLI command implementations.

pub mod bookings;
pub mod import;
pub mod migrate;
pub mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use rjukan_stays_core::{BookingStore, StoreError};
use rjukan_stays_site::config::{ConfigError, StoreConfig};
use rjukan_stays_site::db::{self, OpenStoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store could not be opened.
    #[error("{0}")]
    Open(#[from] OpenStoreError),

    /// A store operation failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Unknown booking status filter.
    #[error("Invalid status: {0}. Valid statuses: pending, approved, denied")]
    InvalidStatus(String),

    /// Import source does not exist.
    #[error("Data directory not found: {}", .0.display())]
    DataDirMissing(PathBuf),
}

/// Connect to `PostgreSQL` using `STAYS_DATABASE_URL` (or `DATABASE_URL`),
/// whatever backend the site is configured for.
async fn connect_postgres() -> Result<PgPool, CommandError> {
    let config = StoreConfig::from_env()?;
    let url = config
        .database_url
        .as_ref()
        .ok_or(CommandError::MissingEnvVar("STAYS_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(url).await?)
}

/// Open the store the site is configured to use.
async fn open_configured_store() -> Result<Arc<dyn BookingStore>, CommandError> {
    let config = StoreConfig::from_env()?;
    Ok(db::open_store(&config).await?)
}
