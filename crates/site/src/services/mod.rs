//! Business logic services for the booking site.
//!
//! # Services
//!
//! - `bookings` - Stay submissions, admin decisions and blocked periods,
//!   with availability enforced on the server

pub mod bookings;

pub use bookings::{BookingError, BookingService, Dashboard, Stats};
