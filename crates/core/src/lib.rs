//! Rjukan Stays Core - Booking types and availability rules.
//!
//! This crate provides the pieces shared by every Rjukan Stays component:
//! - `site` - Public booking page, admin console and JSON API
//! - `cli` - Migrations, data import and store maintenance
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no I/O,
//! no database access, no HTTP. Persistence lives behind the
//! [`BookingStore`] trait, implemented by the site crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, guest email and booking status
//! - [`models`] - Bookings, blocked periods and their validated inputs
//! - [`availability`] - Half-open date range overlap rules
//! - [`store`] - The storage contract shared by every backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod availability;
pub mod models;
pub mod store;
pub mod types;

pub use availability::{AvailabilityError, DateRange};
pub use models::{
    BlockedDate, Booking, NewBlockedDate, NewBooking, StoreSnapshot, ValidBlockedDate, ValidBooking,
};
pub use store::{BookingStore, StoreError, StoreResult};
pub use types::*;
