//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! stays-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STAYS_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/site/migrations/` and are embedded into the
//! binary at build time.

use rjukan_stays_site::db::PgStore;

use super::{CommandError, connect_postgres};

/// Run the site's `PostgreSQL` migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect_postgres().await?;

    tracing::info!("Running migrations...");
    PgStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
