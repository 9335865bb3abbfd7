//! JSON file storage.
//!
//! Each collection is one pretty-printed JSON document in the data
//! directory, rewritten wholesale on every mutation:
//!
//! - `bookings.json` - array of bookings
//! - `blocked-dates.json` - array of blocked periods
//! - `settings.json` - object of setting key to value
//!
//! A mutation holds its collection's write lock across the whole
//! read-modify-write, so id assignment never races. Documents are written
//! to a sibling temp file and renamed into place; a reader sees either the
//! old document or the new one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::instrument;

use rjukan_stays_core::store::{self, StoreError, StoreResult};
use rjukan_stays_core::types::next_id;
use rjukan_stays_core::{
    BlockedDate, BlockedDateId, Booking, BookingId, BookingStatus, BookingStore, NewBlockedDate,
    NewBooking, StoreSnapshot,
};

const BOOKINGS_FILE: &str = "bookings.json";
const BLOCKED_DATES_FILE: &str = "blocked-dates.json";
const SETTINGS_FILE: &str = "settings.json";

const ID_SPACE_EXHAUSTED: &str = "id space exhausted";

/// One JSON document guarded by a lock.
#[derive(Debug)]
struct Document {
    path: PathBuf,
    lock: RwLock<()>,
}

impl Document {
    fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(name),
            lock: RwLock::new(()),
        }
    }

    /// Writes `initial` unless the document already exists.
    async fn create_if_missing<T: Serialize + Sync>(&self, initial: &T) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(StoreError::storage)?
        {
            return Ok(());
        }
        tracing::info!(path = %self.path.display(), "Creating data file");
        self.write_unlocked(initial).await
    }

    async fn read<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let _guard = self.lock.read().await;
        self.read_unlocked().await
    }

    /// Like [`read`](Self::read), but a missing document reads as empty.
    async fn read_or_default<T: DeserializeOwned + Default>(&self) -> StoreResult<T> {
        let _guard = self.lock.read().await;
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(StoreError::storage)?
        {
            self.read_unlocked().await
        } else {
            Ok(T::default())
        }
    }

    /// Applies `f` to the current contents and writes the result back.
    async fn update<T, R>(&self, f: impl FnOnce(&mut T) -> StoreResult<R> + Send) -> StoreResult<R>
    where
        T: DeserializeOwned + Serialize + Send + Sync,
        R: Send,
    {
        let _guard = self.lock.write().await;
        let mut contents: T = self.read_unlocked().await?;
        let result = f(&mut contents)?;
        self.write_unlocked(&contents).await?;
        Ok(result)
    }

    async fn read_unlocked<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to read data file");
            StoreError::storage(e)
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to parse data file");
            StoreError::storage(e)
        })
    }

    async fn write_unlocked<T: Serialize + Sync>(&self, contents: &T) -> StoreResult<()> {
        let mut json = serde_json::to_vec_pretty(contents).map_err(StoreError::storage)?;
        json.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(StoreError::storage)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StoreError::storage)
    }
}

/// Booking store backed by JSON files in a data directory.
#[derive(Debug)]
pub struct FileStore {
    bookings: Document,
    blocked_dates: Document,
    settings: Document,
}

impl FileStore {
    /// Open (and if needed initialize) a data directory.
    ///
    /// Missing documents are created empty; a new `settings.json` is seeded
    /// with `admin_email`. Existing documents are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the directory or a document cannot
    /// be created.
    pub async fn open(dir: impl AsRef<Path>, admin_email: &str) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(StoreError::storage)?;

        let store = Self {
            bookings: Document::new(&dir, BOOKINGS_FILE),
            blocked_dates: Document::new(&dir, BLOCKED_DATES_FILE),
            settings: Document::new(&dir, SETTINGS_FILE),
        };

        store.bookings.create_if_missing(&Vec::<Booking>::new()).await?;
        store
            .blocked_dates
            .create_if_missing(&Vec::<BlockedDate>::new())
            .await?;
        let defaults = BTreeMap::from([("admin_email".to_string(), admin_email.to_string())]);
        store.settings.create_if_missing(&defaults).await?;

        Ok(store)
    }

    /// Every collection in `dir` as stored, in file order.
    ///
    /// Nothing is created or seeded: a missing document reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if a document cannot be read or parsed.
    pub async fn read_snapshot(dir: impl AsRef<Path>) -> StoreResult<StoreSnapshot> {
        let dir = dir.as_ref();
        Ok(StoreSnapshot {
            bookings: Document::new(dir, BOOKINGS_FILE).read_or_default().await?,
            blocked_dates: Document::new(dir, BLOCKED_DATES_FILE)
                .read_or_default()
                .await?,
            settings: Document::new(dir, SETTINGS_FILE).read_or_default().await?,
        })
    }

    async fn bookings_where(&self, status: BookingStatus) -> StoreResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self.bookings.read().await?;
        Ok(bookings.into_iter().filter(|b| b.status == status).collect())
    }
}

#[async_trait]
impl BookingStore for FileStore {
    #[instrument(skip(self, input))]
    async fn create_booking(&self, input: NewBooking) -> StoreResult<Booking> {
        let valid = input.validate()?;
        let booking = self
            .bookings
            .update(|bookings: &mut Vec<Booking>| {
                let id = next_id(bookings.iter().map(|b| b.id), BookingId::FIRST, BookingId::next)
                    .ok_or_else(|| StoreError::storage(ID_SPACE_EXHAUSTED))?;
                let booking = Booking::from_input(id, valid, Utc::now());
                bookings.push(booking.clone());
                Ok(booking)
            })
            .await?;
        tracing::debug!(booking_id = %booking.id, "Booking written");
        Ok(booking)
    }

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self.bookings.read().await?;
        store::sort_newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn list_pending(&self) -> StoreResult<Vec<Booking>> {
        let mut bookings = self.bookings_where(BookingStatus::Pending).await?;
        store::sort_oldest_first(&mut bookings);
        Ok(bookings)
    }

    async fn list_approved(&self) -> StoreResult<Vec<Booking>> {
        let mut bookings = self.bookings_where(BookingStatus::Approved).await?;
        store::sort_by_check_in(&mut bookings);
        Ok(bookings)
    }

    async fn get_booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let bookings: Vec<Booking> = self.bookings.read().await?;
        Ok(bookings.into_iter().find(|b| b.id == id))
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: BookingId, status: BookingStatus) -> StoreResult<Booking> {
        store::ensure_decision(status)?;
        self.bookings
            .update(|bookings: &mut Vec<Booking>| {
                let booking = bookings
                    .iter_mut()
                    .find(|b| b.id == id)
                    .ok_or(StoreError::NotFound)?;
                booking.status = status;
                Ok(booking.clone())
            })
            .await
    }

    #[instrument(skip(self))]
    async fn delete_booking(&self, id: BookingId) -> StoreResult<bool> {
        self.bookings
            .update(|bookings: &mut Vec<Booking>| {
                bookings.retain(|b| b.id != id);
                Ok(true)
            })
            .await
    }

    #[instrument(skip(self, input))]
    async fn create_blocked_date(&self, input: NewBlockedDate) -> StoreResult<BlockedDate> {
        let valid = input.validate()?;
        self.blocked_dates
            .update(|blocked: &mut Vec<BlockedDate>| {
                let id = next_id(
                    blocked.iter().map(|b| b.id),
                    BlockedDateId::FIRST,
                    BlockedDateId::next,
                )
                .ok_or_else(|| StoreError::storage(ID_SPACE_EXHAUSTED))?;
                let record = BlockedDate::from_input(id, valid, Utc::now());
                blocked.push(record.clone());
                Ok(record)
            })
            .await
    }

    async fn list_blocked_dates(&self) -> StoreResult<Vec<BlockedDate>> {
        let mut blocked: Vec<BlockedDate> = self.blocked_dates.read().await?;
        blocked.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(blocked)
    }

    #[instrument(skip(self))]
    async fn delete_blocked_date(&self, id: BlockedDateId) -> StoreResult<bool> {
        self.blocked_dates
            .update(|blocked: &mut Vec<BlockedDate>| {
                blocked.retain(|b| b.id != id);
                Ok(true)
            })
            .await
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let settings: BTreeMap<String, String> = self.settings.read().await?;
        Ok(settings.get(key).cloned())
    }

    #[instrument(skip(self, value))]
    async fn set_setting(&self, key: &str, value: &str) -> StoreResult<String> {
        self.settings
            .update(|settings: &mut BTreeMap<String, String>| {
                settings.insert(key.to_string(), value.to_string());
                Ok(value.to_string())
            })
            .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        let _: Vec<Booking> = self.bookings.read().await?;
        Ok(())
    }
}
