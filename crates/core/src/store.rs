//! The storage contract every backend implements.
//!
//! The site ships a JSON file store and a `PostgreSQL` store; both implement
//! [`BookingStore`] so handlers only ever see `Arc<dyn BookingStore>`.
//!
//! # Contract
//!
//! - `create_*` validates its input and fails with [`StoreError::Validation`]
//!   before touching storage.
//! - New bookings are always `pending`, whatever the caller sent.
//! - Ids are assigned by the store and never reused while a larger id exists.
//! - `update_status` only accepts `approved` or `denied`, and does not look at
//!   the current status.
//! - Deletes are idempotent: removing an absent id still reports `true`.
//! - Mutations on one collection are serialized; a reader sees the collection
//!   either before or after a write, never halfway.

use async_trait::async_trait;

use crate::models::{BlockedDate, Booking, NewBlockedDate, NewBooking};
use crate::types::{BlockedDateId, BookingId, BookingStatus};

/// Boxed source error from a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`BookingStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input was missing, malformed or out of order.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record with the requested id.
    #[error("not found")]
    NotFound,

    /// The backing storage failed (I/O, connection, corrupt data).
    #[error("storage error: {0}")]
    Storage(#[source] BoxError),
}

impl StoreError {
    /// Shorthand for a validation error with a fixed message.
    #[must_use]
    pub fn validation(message: &str) -> Self {
        Self::Validation(message.to_string())
    }

    /// Wraps any backend error as [`StoreError::Storage`].
    pub fn storage(err: impl Into<BoxError>) -> Self {
        Self::Storage(err.into())
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for bookings, blocked periods and settings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Creates a pending booking with a fresh id and `created_at = now`.
    async fn create_booking(&self, input: NewBooking) -> StoreResult<Booking>;

    /// All bookings, newest first.
    async fn list_bookings(&self) -> StoreResult<Vec<Booking>>;

    /// Bookings awaiting a decision, oldest first.
    async fn list_pending(&self) -> StoreResult<Vec<Booking>>;

    /// Approved bookings, by ascending check-in date.
    async fn list_approved(&self) -> StoreResult<Vec<Booking>>;

    /// A single booking, or `None` if the id is unknown.
    async fn get_booking(&self, id: BookingId) -> StoreResult<Option<Booking>>;

    /// Sets a booking's status to `approved` or `denied`.
    ///
    /// Fails with [`StoreError::NotFound`] for an unknown id and with
    /// [`StoreError::Validation`] when asked to set `pending`.
    async fn update_status(&self, id: BookingId, status: BookingStatus) -> StoreResult<Booking>;

    /// Removes a booking. Returns `true` whether or not it existed.
    async fn delete_booking(&self, id: BookingId) -> StoreResult<bool>;

    /// Creates a blocked period with a fresh id.
    async fn create_blocked_date(&self, input: NewBlockedDate) -> StoreResult<BlockedDate>;

    /// All blocked periods, by ascending start date.
    async fn list_blocked_dates(&self) -> StoreResult<Vec<BlockedDate>>;

    /// Removes a blocked period. Returns `true` whether or not it existed.
    async fn delete_blocked_date(&self, id: BlockedDateId) -> StoreResult<bool>;

    /// Reads a setting.
    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>>;

    /// Creates or replaces a setting and returns the stored value.
    async fn set_setting(&self, key: &str, value: &str) -> StoreResult<String>;

    /// Verifies the backing storage is reachable.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Rejects status updates that would move a booking back to `pending`.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] unless `status` is a decision.
pub fn ensure_decision(status: BookingStatus) -> StoreResult<()> {
    if status.is_decision() {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "status must be approved or denied, got {status}"
        )))
    }
}

/// Sort order for [`BookingStore::list_bookings`]: newest first, ties by id.
pub fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Sort order for [`BookingStore::list_pending`]: oldest first, ties by id.
pub fn sort_oldest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// Sort order for [`BookingStore::list_approved`]: by check-in, ties by id.
pub fn sort_by_check_in(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| a.check_in.cmp(&b.check_in).then(a.id.cmp(&b.id)));
}
