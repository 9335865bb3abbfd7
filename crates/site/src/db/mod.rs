//! Storage backends for the booking site.
//!
//! # Backends
//!
//! - [`FileStore`] - JSON documents in a data directory (default)
//! - [`PgStore`] - `PostgreSQL`, selected with `STAYS_STORE=postgres`
//!
//! # Tables (`PostgreSQL`)
//!
//! - `bookings` - Stay requests and their status
//! - `blocked_dates` - Periods closed by the admin
//! - `settings` - Key/value settings (`admin_email`, ...)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p rjukan-stays-cli -- migrate
//! ```

pub mod file_store;
pub mod pg_store;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use rjukan_stays_core::BookingStore;

use crate::config::{StoreConfig, StoreKind};

pub use file_store::FileStore;
pub use pg_store::PgStore;

/// Errors opening a storage backend.
#[derive(Debug, Error)]
pub enum OpenStoreError {
    /// The `PostgreSQL` backend was selected without a URL.
    #[error("STAYS_DATABASE_URL is required for the postgres store")]
    MissingDatabaseUrl,

    /// Could not connect to `PostgreSQL`.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store could not be prepared or seeded.
    #[error("store error: {0}")]
    Store(#[from] rjukan_stays_core::StoreError),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Open the backend selected by configuration.
///
/// # Errors
///
/// Returns `OpenStoreError` if the data directory cannot be prepared or the
/// database cannot be reached.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn BookingStore>, OpenStoreError> {
    match config.kind {
        StoreKind::File => {
            let store = FileStore::open(&config.data_dir, &config.admin_email).await?;
            tracing::info!(data_dir = %config.data_dir.display(), "Using file store");
            Ok(Arc::new(store))
        }
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_ref()
                .ok_or(OpenStoreError::MissingDatabaseUrl)?;
            let pool = create_pool(url).await?;
            let store = PgStore::new(pool);
            store.seed_setting("admin_email", &config.admin_email).await?;
            tracing::info!("Using PostgreSQL store");
            Ok(Arc::new(store))
        }
    }
}
