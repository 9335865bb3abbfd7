//! Booking lifecycle status.
//!
//! ```text
//! pending ──► approved
//!    │
//!    └──────► denied
//! ```
//!
//! Every booking starts `pending`. An admin moves it to `approved` or
//! `denied`. Stores do not check the current status before applying a
//! decision, so an approved booking can later be denied and vice versa;
//! only a move back to `pending` is refused.

use serde::{Deserialize, Serialize};

/// Status of a stay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Submitted by a guest, awaiting an admin decision.
    #[default]
    Pending,
    /// Accepted; the stay now blocks its dates.
    Approved,
    /// Rejected; the dates stay free.
    Denied,
}

impl BookingStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Denied];

    /// Lowercase wire/storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Whether an admin may set this status through a status update.
    #[must_use]
    pub const fn is_decision(&self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }

    /// Whether a booking in this status occupies its dates.
    #[must_use]
    pub const fn blocks_dates(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(format!("invalid booking status: {other}")),
        }
    }
}
