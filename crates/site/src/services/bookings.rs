//! Booking rules on top of the store.
//!
//! The store persists whatever validated input it is given; this service
//! adds the availability rules. A guest submission is checked against the
//! approved stays and blocked periods before a pending record is created,
//! and an approval is re-checked against the other approved stays so two
//! overlapping requests can never both end up approved.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use rjukan_stays_core::availability::{self, AvailabilityError, DateRange};
use rjukan_stays_core::{
    BlockedDate, Booking, BookingId, BookingStatus, BookingStore, NewBlockedDate, NewBooking,
    StoreError,
};

/// Errors from booking operations.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error("booking {0} not found")]
    NotFound(BookingId),
}

/// Counts shown at the top of the admin console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub pending: usize,
    pub approved: usize,
    pub blocked: usize,
}

/// Everything the admin console lists.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub stats: Stats,
    pub pending: Vec<Booking>,
    pub approved: Vec<Booking>,
    pub all: Vec<Booking>,
    pub blocked_dates: Vec<BlockedDate>,
}

/// Booking operations with availability enforcement.
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    // Held across the availability check and the status write of an approval.
    approvals: Mutex<()>,
}

impl BookingService {
    /// Create a service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            store,
            approvals: Mutex::new(()),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Busy intervals from approved stays and blocked periods.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Store` if either collection cannot be read.
    pub async fn unavailable_intervals(&self) -> Result<Vec<DateRange>, BookingError> {
        let approved = self.store.list_approved().await?;
        let blocked = self.store.list_blocked_dates().await?;
        Ok(availability::unavailable_intervals(&approved, &blocked))
    }

    /// Submit a guest's stay request.
    ///
    /// The input is validated, then checked against the busy intervals. Only
    /// an available request is stored, as `pending`.
    ///
    /// # Errors
    ///
    /// - `BookingError::Store(Validation)` for missing or malformed fields
    /// - `BookingError::Availability(Unavailable)` when the dates are taken
    /// - `BookingError::Store(Storage)` when the store fails
    #[instrument(skip(self, input), fields(check_in = ?input.check_in, check_out = ?input.check_out))]
    pub async fn submit(&self, input: NewBooking) -> Result<Booking, BookingError> {
        let valid = input.validate()?;
        let busy = self.unavailable_intervals().await?;
        availability::check_range(valid.stay.start, valid.stay.end, &busy).inspect_err(|e| {
            tracing::info!(error = %e, "Rejected stay request for unavailable dates");
        })?;

        let booking = self.store.create_booking(input).await?;
        tracing::info!(
            booking_id = %booking.id,
            guest_email = %booking.guest_email,
            nights = booking.stay().nights(),
            "Stay request submitted"
        );
        Ok(booking)
    }

    /// Apply an admin decision to a booking.
    ///
    /// Approving re-checks the stay against the other approved bookings and
    /// the blocked periods. Denying always succeeds for an existing booking.
    /// The current status is not consulted, so a decision can be reversed.
    ///
    /// # Errors
    ///
    /// - `BookingError::NotFound` for an unknown id
    /// - `BookingError::Store(Validation)` when `status` is `pending`
    /// - `BookingError::Availability(Unavailable)` for a conflicting approval
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        rjukan_stays_core::store::ensure_decision(status)?;

        if status != BookingStatus::Approved {
            return self.write_status(id, status).await;
        }

        let _guard = self.approvals.lock().await;

        let booking = self
            .store
            .get_booking(id)
            .await?
            .ok_or(BookingError::NotFound(id))?;

        let others: Vec<Booking> = self
            .store
            .list_approved()
            .await?
            .into_iter()
            .filter(|b| b.id != id)
            .collect();
        let blocked = self.store.list_blocked_dates().await?;
        let busy = availability::unavailable_intervals(&others, &blocked);

        availability::check_range(booking.check_in, booking.check_out, &busy).inspect_err(|e| {
            tracing::warn!(booking_id = %id, error = %e, "Refused conflicting approval");
        })?;

        self.write_status(id, status).await
    }

    async fn write_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        match self.store.update_status(id, status).await {
            Ok(booking) => {
                tracing::info!(booking_id = %id, status = %status, "Booking status updated");
                Ok(booking)
            }
            Err(StoreError::NotFound) => Err(BookingError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Close a period for bookings.
    ///
    /// Blocking dates that overlap an approved stay is allowed; the overlap is
    /// logged so the admin can follow up with the guest.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Store` for invalid dates or storage failures.
    #[instrument(skip(self, input), fields(start = ?input.start_date, end = ?input.end_date))]
    pub async fn block_dates(&self, input: NewBlockedDate) -> Result<BlockedDate, BookingError> {
        let blocked = self.store.create_blocked_date(input).await?;

        let approved = self.store.list_approved().await?;
        let busy = availability::unavailable_intervals(&approved, &[]);
        let period = blocked.period();
        if availability::is_range_unavailable(period.start, period.end, &busy) {
            tracing::warn!(
                blocked_date_id = %blocked.id,
                period = %period,
                "Blocked period overlaps an approved stay"
            );
        }

        tracing::info!(blocked_date_id = %blocked.id, period = %period, "Dates blocked");
        Ok(blocked)
    }

    /// Load everything the admin console shows.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Store` if a collection cannot be read.
    pub async fn dashboard(&self) -> Result<Dashboard, BookingError> {
        let all = self.store.list_bookings().await?;
        let pending = self.store.list_pending().await?;
        let approved = self.store.list_approved().await?;
        let blocked_dates = self.store.list_blocked_dates().await?;

        Ok(Dashboard {
            stats: Stats {
                pending: pending.len(),
                approved: approved.len(),
                blocked: blocked_dates.len(),
            },
            pending,
            approved,
            all,
            blocked_dates,
        })
    }
}
