//! Import a JSON data directory into `PostgreSQL`.
//!
//! Moves a site from the file store to the database store. Ids and statuses
//! are kept, so links to `/api/bookings/{id}` stay valid. Records already
//! present in the database are left alone, which makes the import safe to
//! re-run.

use std::path::Path;

use rjukan_stays_site::db::{FileStore, PgStore};

use super::{CommandError, connect_postgres};

/// Copy every collection in `data_dir` into the configured database.
///
/// The data directory is only read; a missing document counts as empty.
///
/// # Errors
///
/// Returns an error if the directory does not exist, a document cannot be
/// parsed, or the database transaction fails.
pub async fn run(data_dir: &Path) -> Result<(), CommandError> {
    if !data_dir.is_dir() {
        return Err(CommandError::DataDirMissing(data_dir.to_path_buf()));
    }

    tracing::info!("Reading data directory {}", data_dir.display());
    let snapshot = FileStore::read_snapshot(data_dir).await?;

    let pool = connect_postgres().await?;
    let store = PgStore::new(pool);

    tracing::info!(
        "Importing {} bookings, {} blocked periods, {} settings...",
        snapshot.bookings.len(),
        snapshot.blocked_dates.len(),
        snapshot.settings.len()
    );
    let (bookings, blocked) = store.import_snapshot(&snapshot).await?;

    tracing::info!(
        "Import complete! {} bookings and {} blocked periods inserted",
        bookings,
        blocked
    );
    Ok(())
}
