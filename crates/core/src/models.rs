//! Booking and blocked-period records, and the inputs that create them.
//!
//! Inputs ([`NewBooking`], [`NewBlockedDate`]) arrive from guests and admins
//! and are validated by every store before anything is persisted. Records
//! ([`Booking`], [`BlockedDate`]) are what the stores hand back.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::DateRange;
use crate::store::StoreError;
use crate::types::{BlockedDateId, BookingId, BookingStatus, Email};

/// A stay request from a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Store-assigned id.
    pub id: BookingId,
    /// Guest's full name.
    pub guest_name: String,
    /// Guest's email address.
    pub guest_email: Email,
    /// Guest's phone number, if given.
    #[serde(default)]
    pub guest_phone: Option<String>,
    /// First night of the stay.
    pub check_in: NaiveDate,
    /// Departure day (not a night of the stay).
    pub check_out: NaiveDate,
    /// Number of guests.
    pub guests: u32,
    /// Free-text message to the host.
    #[serde(default)]
    pub message: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: BookingStatus,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Builds a freshly submitted booking from validated input.
    ///
    /// The status is always [`BookingStatus::Pending`].
    #[must_use]
    pub fn from_input(id: BookingId, input: ValidBooking, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            guest_name: input.guest_name,
            guest_email: input.guest_email,
            guest_phone: input.guest_phone,
            check_in: input.stay.start,
            check_out: input.stay.end,
            guests: input.guests,
            message: input.message,
            status: BookingStatus::Pending,
            created_at,
        }
    }

    /// The nights this booking covers.
    #[must_use]
    pub const fn stay(&self) -> DateRange {
        DateRange {
            start: self.check_in,
            end: self.check_out,
        }
    }
}

/// Guest-supplied fields for a new stay request.
///
/// There is deliberately no `status` field: unknown fields (including a
/// `status` sent by a client) are ignored during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBooking {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: String,
    #[serde(default)]
    pub guest_phone: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A [`NewBooking`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub guest_name: String,
    pub guest_email: Email,
    pub guest_phone: Option<String>,
    pub stay: DateRange,
    pub guests: u32,
    pub message: Option<String>,
}

impl NewBooking {
    /// Checks required fields, email shape, guest count and date order.
    ///
    /// Blank optional fields are normalized to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<ValidBooking, StoreError> {
        let guest_name = self.guest_name.trim();
        if guest_name.is_empty() {
            return Err(StoreError::validation("guest name is required"));
        }

        let guest_email = Email::parse(&self.guest_email)
            .map_err(|e| StoreError::Validation(format!("guest email: {e}")))?;

        let guests = match self.guests {
            Some(0) => return Err(StoreError::validation("at least one guest is required")),
            Some(n) => n,
            None => return Err(StoreError::validation("number of guests is required")),
        };

        let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) else {
            return Err(StoreError::validation(
                "check-in and check-out dates are required",
            ));
        };
        let stay = DateRange::new(check_in, check_out).map_err(|_| {
            StoreError::validation("check-out date must be after check-in date")
        })?;

        Ok(ValidBooking {
            guest_name: guest_name.to_string(),
            guest_email,
            guest_phone: non_blank(self.guest_phone.as_deref()),
            stay,
            guests,
            message: non_blank(self.message.as_deref()),
        })
    }
}

/// A period the admin has closed for bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedDate {
    /// Store-assigned id.
    pub id: BlockedDateId,
    /// First blocked night.
    pub start_date: NaiveDate,
    /// First night that is free again.
    pub end_date: NaiveDate,
    /// Why the dates are closed (maintenance, owner stay, ...).
    #[serde(default)]
    pub reason: Option<String>,
    /// When the block was created.
    pub created_at: DateTime<Utc>,
}

impl BlockedDate {
    /// Builds a blocked period from validated input.
    #[must_use]
    pub fn from_input(id: BlockedDateId, input: ValidBlockedDate, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            start_date: input.period.start,
            end_date: input.period.end,
            reason: input.reason,
            created_at,
        }
    }

    /// The nights this block covers.
    #[must_use]
    pub const fn period(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// Admin-supplied fields for a new blocked period.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBlockedDate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A [`NewBlockedDate`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBlockedDate {
    pub period: DateRange,
    pub reason: Option<String>,
}

impl NewBlockedDate {
    /// Checks that both dates are present and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if a date is missing or
    /// `start_date >= end_date`.
    pub fn validate(&self) -> Result<ValidBlockedDate, StoreError> {
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return Err(StoreError::validation("start and end dates are required"));
        };
        let period = DateRange::new(start, end)
            .map_err(|_| StoreError::validation("end date must be after start date"))?;

        Ok(ValidBlockedDate {
            period,
            reason: non_blank(self.reason.as_deref()),
        })
    }
}

/// Every collection a store owns, as plain data.
///
/// Used to move data between backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub bookings: Vec<Booking>,
    pub blocked_dates: Vec<BlockedDate>,
    pub settings: BTreeMap<String, String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
